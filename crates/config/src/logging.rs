//! `[log]` section
//!
//! Diagnostics of the tally CLI: skipped records, fallbacks and per-period
//! summaries. They are written to stderr or a file; stdout only ever carries
//! the report.

use serde::Deserialize;

/// Crates whose events the configured level applies to
const TALLY_TARGETS: &[&str] = &["tally", "tally_analytics", "tally_config"];

/// Verbosity of tally's own diagnostics
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    /// Per-period summaries, resolver fallbacks
    Debug,
    #[default]
    Info,
    /// Unparseable timestamps, dropped events
    Warn,
    Error,
}

impl LogLevel {
    fn name(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `EnvFilter` directive for this level
    ///
    /// The level applies to tally's crates only; anything else logs at `warn`.
    pub fn directive(self) -> String {
        let level = self.name();
        let mut directive = String::from("warn");
        for target in TALLY_TARGETS {
            directive.push_str(&format!(",{target}={level}"));
        }
        directive
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Where diagnostics go
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    /// Append to this path
    #[serde(untagged)]
    File(String),
}

impl LogOutput {
    /// Target file, if logging to one
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Stderr => None,
            Self::File(path) => Some(path),
        }
    }
}

/// `[log]` settings
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "/var/log/tally.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
}
