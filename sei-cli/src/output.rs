use crate::cli::OutputFormat;
use anyhow::{Context, Result};
#[cfg(feature = "colored-output")]
use colored::*;
use hevc_sei::{AuxSeiReport, DepthRepresentationInfo, SeiMessage};
use serde::Serialize;

#[derive(Serialize)]
struct ReportOutput<'a> {
    messages: &'a [SeiMessage],
    warnings: Vec<WarningOutput>,
}

#[derive(Serialize)]
struct WarningOutput {
    nal_offset: usize,
    payload_type: u8,
    error: String,
}

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_report(&self, report: &AuxSeiReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(report)),
            OutputFormat::Json => self.format_json(report, true),
            OutputFormat::JsonCompact => self.format_json(report, false),
        }
    }

    fn format_pretty(&self, report: &AuxSeiReport) -> String {
        let mut output = String::new();

        if report.messages.is_empty() {
            output.push_str(&self.colorize("No supported SEI messages found", &Color::Yellow, true));
            output.push('\n');
        }

        for (index, message) in report.messages.iter().enumerate() {
            if index > 0 {
                output.push('\n');
            }

            match message {
                SeiMessage::DepthRepresentationInfo(info) => {
                    output.push_str(&self.colorize(
                        &format!("Depth Representation Info (#{}):", index + 1),
                        &Color::Green,
                        true,
                    ));
                    output.push('\n');
                    self.push_depth_info(&mut output, info);
                }
                other => {
                    output.push_str(&self.colorize(
                        &format!("SEI payload type {}", other.payload_type()),
                        &Color::Green,
                        true,
                    ));
                    output.push('\n');
                }
            }
        }

        if !report.warnings.is_empty() {
            output.push('\n');
            output.push_str(&self.colorize("Warnings:", &Color::Yellow, true));
            output.push('\n');

            for warning in &report.warnings {
                output.push_str(&format!(
                    "  nal @ {}, payload type {}: {}\n",
                    warning.nal_offset, warning.payload_type, warning.error
                ));
            }
        }

        output
    }

    fn push_depth_info(&self, output: &mut String, info: &DepthRepresentationInfo) {
        self.push_field(
            output,
            "Type",
            &format!(
                "{:?} ({})",
                info.depth_representation_type,
                info.depth_representation_type.code()
            ),
        );

        if let Some(view) = info.disparity_reference_view {
            self.push_field(output, "Disparity Reference View", &view.to_string());
        }

        let bounds = [
            ("Z Near", info.z_near),
            ("Z Far", info.z_far),
            ("D Min", info.d_min),
            ("D Max", info.d_max),
        ];
        for (name, value) in bounds {
            if let Some(value) = value {
                self.push_field(output, name, &value.to_string());
            }
        }

        if let Some(model) = info.nonlinear_model {
            self.push_field(
                output,
                "Nonlinear Model",
                &format!("{} bits not decoded", model.remaining_bits),
            );
        }
    }

    fn push_field(&self, output: &mut String, name: &str, value: &str) {
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(name, &Color::Yellow, false),
            self.colorize(value, &Color::Cyan, false)
        ));
    }

    fn format_json(&self, report: &AuxSeiReport, pretty: bool) -> Result<String> {
        let output = ReportOutput {
            messages: &report.messages,
            warnings: report
                .warnings
                .iter()
                .map(|warning| WarningOutput {
                    nal_offset: warning.nal_offset,
                    payload_type: warning.payload_type,
                    error: warning.error.to_string(),
                })
                .collect(),
        };

        if pretty {
            serde_json::to_string_pretty(&output).context("Failed to serialize report")
        } else {
            serde_json::to_string(&output).context("Failed to serialize report")
        }
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Cyan,
}
