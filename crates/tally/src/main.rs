//! Tally - dashboard numbers for booking and stock exports
//!
//! # Usage
//!
//! ```bash
//! # Today's bookings
//! tally stats --events appointments.json
//!
//! # A month against the one before it
//! tally stats -e appointments.json --range month --date 2024-03-01 --compare previous
//!
//! # An explicit week against a custom calendar week, as JSON
//! tally stats -e appointments.json -r week --start 2024-03-06 --end 2024-03-12 \
//!     --compare-date 2024-02-28 --format json
//! ```

mod cmd;
mod output;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tally_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Tally - dashboard numbers for booking and stock exports
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate events for a period, optionally against a baseline
    Stats(cmd::stats::StatsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, &config.log)?;

    match cli.command {
        Command::Stats(args) => cmd::stats::run(args, &config),
    }
}

/// Load the config file if one was given, defaults otherwise
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Resolve the filter directive: CLI flag > config file
///
/// The flag is taken verbatim, so it may be any `EnvFilter` directive.
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.directive(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs never go to stdout, which carries the report.
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (writer, ansi) = match &log.output {
        LogOutput::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            atty::is(atty::Stream::Stderr),
        ),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let layer = match log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    Ok(())
}
