//! Event selection
//!
//! Picks the events whose timestamp falls inside a resolved interval,
//! optionally narrowed to one status or category.

use chrono::{DateTime, FixedOffset};

use crate::event::{Event, EventStatus};
use crate::timerange::Interval;

/// An event that passed the filter, with its parsed local timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedEvent<'a> {
    /// The source record
    pub event: &'a Event,
    /// Timestamp in the engine's zone
    pub at: DateTime<FixedOffset>,
}

/// Result of filtering a batch of events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredEvents<'a> {
    /// Matching events, in input order
    pub events: Vec<MatchedEvent<'a>>,
    /// Records skipped because their timestamp could not be parsed
    pub skipped: usize,
}

impl<'a> FilteredEvents<'a> {
    /// Number of matching events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over matches
    pub fn iter(&self) -> impl Iterator<Item = &MatchedEvent<'a>> {
        self.events.iter()
    }
}

/// Filter over a resolved interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Period to select (inclusive on both ends)
    pub interval: Interval,
    /// Only keep this status
    pub status: Option<EventStatus>,
    /// Only keep this category
    pub category: Option<String>,
}

impl EventFilter {
    /// Create a filter for an interval
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            status: None,
            category: None,
        }
    }

    /// Only keep events with this status
    pub fn with_status(mut self, status: impl Into<EventStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Only keep events with this category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Apply the filter
    ///
    /// Records with malformed timestamps never match and are counted in
    /// `skipped`; they do not abort the pass.
    pub fn apply<'a>(&self, events: &'a [Event], tz: &FixedOffset) -> FilteredEvents<'a> {
        let mut out = FilteredEvents::default();

        for event in events {
            let Some(at) = event.local_time(tz) else {
                out.skipped += 1;
                continue;
            };

            if !self.interval.contains(&at) {
                continue;
            }

            if let Some(status) = &self.status
                && event.status.as_ref() != Some(status)
            {
                continue;
            }

            if let Some(category) = &self.category
                && event.category.as_deref() != Some(category.as_str())
            {
                continue;
            }

            out.events.push(MatchedEvent { event, at });
        }

        if out.skipped > 0 {
            tracing::warn!(
                skipped = out.skipped,
                "skipped events with unparseable timestamps"
            );
        }

        out
    }
}

/// Select events inside `interval`
pub fn filter_events<'a>(
    events: &'a [Event],
    interval: &Interval,
    tz: &FixedOffset,
) -> FilteredEvents<'a> {
    EventFilter::new(*interval).apply(events, tz)
}
