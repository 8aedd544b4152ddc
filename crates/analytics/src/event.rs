//! Event records consumed by the engine
//!
//! Events arrive from the data source already materialized. The timestamp is
//! kept as received and parsed on demand, so one malformed record only
//! excludes itself.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Naive date-time layouts accepted after RFC 3339 fails
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A booking or stock event
///
/// Deserialization never rejects a record over one odd field: numeric ids
/// and timestamps are stringified, `null` or structured values read as
/// empty, and a non-string status or category reads as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Record identifier
    #[serde(default, alias = "_id", deserialize_with = "lenient_string")]
    pub id: String,
    /// Raw timestamp as sent by the data source (missing reads as empty and
    /// is skipped like any other malformed value)
    #[serde(
        default,
        alias = "appointmentDateTime",
        alias = "date",
        deserialize_with = "lenient_string"
    )]
    pub timestamp: String,
    /// Lifecycle status (stock movements have none)
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<EventStatus>,
    /// Optional grouping label (stock operation, service type)
    #[serde(
        default,
        alias = "operation",
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
}

impl Event {
    /// Create an event with a status
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        status: impl Into<EventStatus>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            status: Some(status.into()),
            category: None,
        }
    }

    /// Create an event without a status
    pub fn untracked(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            status: None,
            category: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Parse the timestamp into the given zone
    ///
    /// Returns `None` for malformed values.
    pub fn local_time(&self, tz: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp, tz)
    }
}

/// A record field of whatever JSON type the source sent
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Other(IgnoredAny),
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Text(s) => s,
        LooseValue::Int(n) => n.to_string(),
        LooseValue::UInt(n) => n.to_string(),
        LooseValue::Float(n) => n.to_string(),
        LooseValue::Other(_) => String::new(),
    })
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Text(s) => Some(s),
        _ => None,
    })
}

fn lenient_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<EventStatus>, D::Error> {
    Ok(lenient_label(deserializer)?.map(EventStatus::from))
}

/// Parse a timestamp string into the given zone
///
/// RFC 3339 values keep their instant and are shifted into `tz`. Values
/// without an offset are read as wall-clock time in `tz`. A bare date means
/// midnight.
pub fn parse_timestamp(s: &str, tz: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive).single()
}

/// Event status
///
/// Known dashboard statuses get their own variant; anything else is kept
/// verbatim so it still shows up in distributions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    /// Booked, not yet happened
    Upcoming,
    /// Took place
    Completed,
    /// Cancelled before it happened
    Cancelled,
    /// Customer did not show up
    NoArrival,
    /// Moved to another slot
    Rescheduled,
    /// Any other label
    Other(String),
}

impl EventStatus {
    /// Parse a status label (case-insensitive for known labels)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Self::Upcoming,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            "no arrival" | "no_arrival" | "noarrival" => Self::NoArrival,
            "rescheduled" => Self::Rescheduled,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Display label, as shown on the dashboard
    pub fn label(&self) -> &str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoArrival => "No Arrival",
            Self::Rescheduled => "Rescheduled",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for EventStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<EventStatus> for String {
    fn from(status: EventStatus) -> Self {
        status.label().to_string()
    }
}
