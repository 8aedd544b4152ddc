//! Tally Analytics Engine
//!
//! Period-based analytics for appointments and stock movements.
//!
//! # Overview
//!
//! The engine takes an already fetched list of events and turns it into
//! dashboard numbers. It never performs IO.
//!
//! - **Period resolution**: day, week, month and year intervals around an anchor
//! - **Filtering**: inclusive membership, malformed timestamps skipped and counted
//! - **Bucketing**: dense hourly, daily, weekly and monthly series
//! - **Aggregation**: totals, status distribution, average per day, forecast
//! - **Comparison**: percent deltas against a baseline period
//!
//! # Usage
//!
//! ```
//! use chrono::{NaiveDate, TimeZone};
//! use tally_analytics::{AnalyticsEngine, Event, PeriodParams, Query, RangeKind, utc};
//!
//! let events = vec![
//!     Event::new("1", "2024-03-05T10:00", "Completed"),
//!     Event::new("2", "2024-03-05T14:00", "Cancelled"),
//! ];
//!
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//! let now = utc().with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();
//! let query = Query::new(Some(RangeKind::Day), PeriodParams::anchored(anchor), now);
//!
//! let result = AnalyticsEngine::default().compare(&events, &query);
//! assert_eq!(result.current.total, 2);
//! assert!(result.baseline.is_none());
//! ```
//!
//! # Comparison Support
//!
//! ```
//! # use chrono::{NaiveDate, TimeZone};
//! # use tally_analytics::{AnalyticsEngine, CompareMode, Event, PeriodParams, Query, RangeKind, utc};
//! # let events: Vec<Event> = Vec::new();
//! # let anchor = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//! # let now = utc().with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();
//! let query = Query::new(Some(RangeKind::Month), PeriodParams::anchored(anchor), now)
//!     .with_compare_mode(CompareMode::PreviousPeriod);
//!
//! let result = AnalyticsEngine::default().compare(&events, &query);
//! // Zero baseline: no percentage, rendered as the "+100%" sentinel
//! assert_eq!(result.delta_percent.total, None);
//! ```

pub mod compare;
pub mod engine;
pub mod error;
pub mod event;
pub mod filter;
pub mod stats;
pub mod timerange;
pub mod timeseries;

#[cfg(test)]
mod filter_test;
#[cfg(test)]
mod timeseries_test;

// Re-exports for convenience
pub use compare::{
    CompareMode, ComparisonResult, Deltas, NO_BASELINE, Trend, format_delta, percent_change,
};
pub use engine::{AnalyticsEngine, Query};
pub use error::{AnalyticsError, Result};
pub use event::{Event, EventStatus, parse_timestamp};
pub use filter::{EventFilter, FilteredEvents, MatchedEvent, filter_events};
pub use stats::{Distribution, PeriodStats, aggregate, round1};
pub use timerange::{
    Interval, PeriodMode, PeriodParams, PeriodResolver, RangeKind, WeekStart, days_between,
    parse_date, parse_offset, previous_anchor, utc,
};
pub use timeseries::{Bucket, BucketSeries, HOURS_PER_DAY, bucketize};
