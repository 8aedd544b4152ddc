//! Configuration validation
//!
//! Validates values serde cannot check on its own:
//! - `utc_offset` parses as a fixed offset
//! - a log file output names a path other than stdout, which carries the
//!   report

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_log(config)?;
    validate_analytics(config)?;
    Ok(())
}

fn validate_log(config: &Config) -> Result<()> {
    let Some(path) = config.log.output.file() else {
        return Ok(());
    };
    match path.trim() {
        "" => Err(ConfigError::invalid_value(
            "log",
            "output",
            "file path must not be empty",
        )),
        "stdout" | "-" | "/dev/stdout" => Err(ConfigError::invalid_value(
            "log",
            "output",
            "stdout is reserved for the report",
        )),
        _ => Ok(()),
    }
}

fn validate_analytics(config: &Config) -> Result<()> {
    config.analytics.timezone()?;
    Ok(())
}
