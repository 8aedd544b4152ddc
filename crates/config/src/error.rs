//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - a field is present but unusable
    #[error("[{section}] has invalid {field}: {message}")]
    InvalidValue {
        /// Config section (e.g., "analytics", "log")
        section: &'static str,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create an InvalidValue error
    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("analytics", "utc_offset", "use +HH:MM");
        let msg = err.to_string();
        assert!(msg.contains("[analytics]"));
        assert!(msg.contains("utc_offset"));
        assert!(msg.contains("+HH:MM"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ConfigError::IoError {
            path: "missing.toml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_parse_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("invalid { toml").unwrap_err();
        let err: ConfigError = toml_err.into();
        assert!(err.to_string().starts_with("failed to parse config"));
    }
}
