use anyhow::{Context, Result};
use hevc_sei::AuxSeiOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, OutputFormat};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format
    pub output_format: OutputFormat,

    /// Only decode the first NAL unit and its first SEI message
    pub first_nal_only: bool,

    /// Report malformed messages as warnings instead of failing
    pub skip_malformed_messages: bool,
}

impl AppConfig {
    /// Load configuration from file, defaults when no path is given
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read configuration file {}", path.display())
                })?;
                Self::parse(&content)
            }
            None => Ok(Self::default()),
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration file")
    }

    /// Command line flags win over the file
    pub fn merge_args(mut self, args: &Args) -> Self {
        if let Some(output) = args.output {
            self.output_format = output;
        }
        self.first_nal_only |= args.first_nal_only;
        self.skip_malformed_messages |= args.skip_malformed;
        self
    }

    pub fn decoder_options(&self) -> AuxSeiOptions {
        AuxSeiOptions {
            first_nal_only: self.first_nal_only,
            skip_malformed_messages: self.skip_malformed_messages,
        }
    }
}
