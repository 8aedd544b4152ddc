//! Analytics error types
//!
//! The aggregation itself never fails on data. These errors cover
//! caller-supplied parameters (range names, dates, offsets).

use thiserror::Error;

/// Analytics errors
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Unknown range kind
    #[error("invalid range kind: {0}")]
    InvalidRangeKind(String),

    /// Unknown comparison mode
    #[error("invalid compare mode: {0}")]
    InvalidCompareMode(String),

    /// Unparseable calendar date
    #[error("invalid date: {0} (use YYYY-MM-DD)")]
    InvalidDate(String),

    /// Unparseable UTC offset
    #[error("invalid utc offset: {0} (use +HH:MM)")]
    InvalidOffset(String),

    /// Interval with end before start
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// Unknown week start day
    #[error("invalid week start: {0} (use monday or sunday)")]
    InvalidWeekStart(String),
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
