//! Analytics defaults
//!
//! Zone, week convention and default view used when the command line leaves
//! them out.

use chrono::FixedOffset;
use serde::Deserialize;
use tally_analytics::{CompareMode, RangeKind, WeekStart, parse_offset};

use crate::error::{ConfigError, Result};

/// Analytics configuration
///
/// # Example
///
/// ```toml
/// [analytics]
/// utc_offset = "+01:00"
/// week_starts_on = "monday"
/// default_range = "month"
/// compare = "previous_period"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Offset used for day and hour boundaries (`Z`, `+HH:MM`, `-HHMM`)
    /// Default: +00:00
    pub utc_offset: String,

    /// First day of calendar weeks
    /// Default: sunday
    pub week_starts_on: WeekStart,

    /// Range kind when none is given
    /// Default: day
    pub default_range: RangeKind,

    /// Comparison when none is given (none, previous_period, custom)
    /// Default: none
    pub compare: CompareMode,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            utc_offset: "+00:00".to_string(),
            week_starts_on: WeekStart::default(),
            default_range: RangeKind::Day,
            compare: CompareMode::None,
        }
    }
}

impl AnalyticsConfig {
    /// Parsed `utc_offset`
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the offset is malformed.
    pub fn timezone(&self) -> Result<FixedOffset> {
        parse_offset(&self.utc_offset)
            .map_err(|e| ConfigError::invalid_value("analytics", "utc_offset", e.to_string()))
    }
}
