mod cli;
mod config;
mod output;

use crate::{cli::Args, config::AppConfig, output::OutputManager};
use anyhow::{Context, Result};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use hevc_sei::AuxSeiDecoder;
use std::io::IsTerminal;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

fn main() {
    let result = run();

    if let Err(e) = result {
        error!("Application error: {:#}", e);
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {:#}", e);
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet).context("Failed to initialize logging")?;

    // Load configuration
    let config = AppConfig::load(args.config.as_deref())?.merge_args(&args);
    debug!("Starting sei-dump with config: {:?}", config);

    let data = read_input(&args)?;
    debug!(bytes = data.len(), "read sei array");

    let report = AuxSeiDecoder::new(config.decoder_options())
        .decode(&data)
        .context("Failed to decode SEI array")?;

    let output = OutputManager::new(std::io::stdout().is_terminal())
        .format_report(&report, &config.output_format)?;
    println!("{}", output.trim_end());

    Ok(())
}

fn read_input(args: &Args) -> Result<Vec<u8>> {
    match (&args.hex, &args.file) {
        (Some(hex), _) => {
            let digits: String = hex.split_whitespace().collect();
            hex::decode(digits).context("Invalid hex input")
        }
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => anyhow::bail!("No input given, pass a file or --hex"),
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
