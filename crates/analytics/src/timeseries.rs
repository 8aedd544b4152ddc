//! Bucketed time series
//!
//! Groups filtered events into hour, day, week and month buckets for charts.
//! Every bucket an interval spans exists up front with a zero count, so
//! charts never see gaps.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::filter::FilteredEvents;
use crate::timerange::{Interval, RangeKind};

/// Hours in a day bucket series
pub const HOURS_PER_DAY: u32 = 24;

/// A labeled time slot with an event count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Slot label (`10:00`, `2024-03-05`, `Week 10`, `March 2024`)
    pub key: String,
    /// Events counted in this slot
    pub count: u64,
}

impl Bucket {
    /// Create an empty bucket
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: 0,
        }
    }
}

/// All bucket series for one interval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSeries {
    /// `0:00`..`23:00`, only populated for day ranges
    pub hourly: Vec<Bucket>,
    /// One bucket per calendar date
    pub daily: Vec<Bucket>,
    /// One bucket per ISO week number
    pub weekly: Vec<Bucket>,
    /// One bucket per month
    pub monthly: Vec<Bucket>,
    /// Events that matched no pre-built bucket (always 0 when the interval
    /// and the events agree)
    #[serde(default)]
    pub dropped: usize,
}

impl BucketSeries {
    /// The series a chart shows by default: hourly for days, daily otherwise
    pub fn primary(&self, kind: Option<RangeKind>) -> &[Bucket] {
        match kind {
            Some(RangeKind::Day) => &self.hourly,
            _ => &self.daily,
        }
    }

    /// Sum of the daily counts
    pub fn daily_total(&self) -> u64 {
        self.daily.iter().map(|b| b.count).sum()
    }
}

/// Build dense bucket series for the events of one interval
///
/// Buckets are created by walking the interval day by day before any event
/// is counted. Order is chronological, never by count.
pub fn bucketize(
    filtered: &FilteredEvents<'_>,
    interval: &Interval,
    kind: Option<RangeKind>,
) -> BucketSeries {
    let with_hours = kind == Some(RangeKind::Day);

    let mut hourly = KeyedBuckets::default();
    if with_hours {
        for hour in 0..HOURS_PER_DAY {
            hourly.insert_empty(hour_key(hour));
        }
    }

    let mut daily = KeyedBuckets::default();
    let mut weekly = KeyedBuckets::default();
    let mut monthly = KeyedBuckets::default();

    for date in interval.dates() {
        daily.insert_empty(day_key(&date));
        weekly.insert_empty(week_key(&date));
        monthly.insert_empty(month_key(&date));
    }

    let mut dropped = 0;
    for matched in filtered.iter() {
        let at = &matched.at;
        let date = at.date_naive();

        let mut hit = daily.increment(&day_key(&date));
        hit &= weekly.increment(&week_key(&date));
        hit &= monthly.increment(&month_key(&date));
        if with_hours {
            hit &= hourly.increment(&hour_key(at.hour()));
        }

        if !hit {
            dropped += 1;
            tracing::warn!(
                event_id = %matched.event.id,
                timestamp = %at,
                "event fell outside the bucket walk"
            );
        }
    }

    BucketSeries {
        hourly: hourly.into_buckets(),
        daily: daily.into_buckets(),
        weekly: weekly.into_buckets(),
        monthly: monthly.into_buckets(),
        dropped,
    }
}

/// Hour label, `0:00` through `23:00`
pub fn hour_key(hour: u32) -> String {
    format!("{}:00", hour)
}

/// Calendar date label, `2024-03-05`
pub fn day_key(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO week label, `Week 10`
pub fn week_key(date: &NaiveDate) -> String {
    format!("Week {}", date.iso_week().week())
}

/// Month label, `March 2024`
pub fn month_key(date: &NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Insertion-ordered buckets with keyed lookup
#[derive(Debug, Default)]
struct KeyedBuckets {
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
}

impl KeyedBuckets {
    /// Add a zero bucket unless the key already exists
    fn insert_empty(&mut self, key: String) {
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.buckets.len());
        self.buckets.push(Bucket::empty(key));
    }

    /// Count one event; returns false when no bucket has this key
    fn increment(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.buckets[i].count += 1;
                true
            }
            None => false,
        }
    }

    fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
    }
}
