use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sei-dump",
    about = "sei-dump - decode the HEVC SEI array attached to a HEIF auxiliary image",
    version,
    author
)]
pub struct Args {
    /// File holding the raw SEI array
    #[arg(required_unless_present = "hex", conflicts_with = "hex")]
    pub file: Option<PathBuf>,

    /// SEI array as a hex string (whitespace is ignored)
    #[arg(long)]
    pub hex: Option<String>,

    /// Output format
    #[arg(short, long)]
    pub output: Option<OutputFormat>,

    /// Only decode the first NAL unit and its first SEI message
    #[arg(long)]
    pub first_nal_only: bool,

    /// Report malformed messages as warnings instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// Compact JSON output
    JsonCompact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonCompact => write!(f, "json-compact"),
        }
    }
}
