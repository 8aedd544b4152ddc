//! Period aggregation
//!
//! Summary numbers for one resolved interval: totals, status and category
//! distributions, average per day and a linear forecast to the end of the
//! period.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::filter::FilteredEvents;
use crate::timerange::{Interval, RangeKind, days_between};
use crate::timeseries::{BucketSeries, bucketize};

/// Counts per label
///
/// Only labels that were actually observed are present; there is no zero
/// fill (unlike bucket series). Labels iterate and serialize sorted, so the
/// same events always produce the same report whatever their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(BTreeMap<String, u64>);

impl Distribution {
    /// Count one occurrence of a label
    pub fn record(&mut self, label: impl Into<String>) {
        *self.0.entry(label.into()).or_insert(0) += 1;
    }

    /// Count for a label, if observed
    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.get(label).copied()
    }

    /// Count for a label, 0 if not observed
    pub fn count(&self, label: &str) -> u64 {
        self.get(label).unwrap_or(0)
    }

    /// Observed labels, sorted
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over (label, count)
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was observed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts
    pub fn sum(&self) -> u64 {
        self.0.values().sum()
    }

    /// Whole-number share of `total` for a label (`round(count / total * 100)`)
    ///
    /// `None` when `total` is 0.
    pub fn share_percent(&self, label: &str, total: u64) -> Option<u64> {
        if total == 0 {
            return None;
        }
        let share = self.count(label) as f64 / total as f64 * 100.0;
        Some(share.round() as u64)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Aggregated statistics for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    /// Events in the period
    pub total: u64,
    /// Events per status label
    pub status_distribution: Distribution,
    /// Events per category label
    pub category_distribution: Distribution,
    /// Dense chart series
    pub buckets: BucketSeries,
    /// Average events per day, rounded to one decimal
    pub avg_per_day: f64,
    /// Forecast total at the end of the period, rounded to one decimal
    pub predicted_total: f64,
    /// The resolved period
    pub interval: Interval,
    /// Records skipped because of malformed timestamps
    pub skipped: usize,
}

/// Aggregate the filtered events of one interval
///
/// `now` only feeds the forecast: the remaining days are
/// `days_between(now, interval.end)`, which goes negative once the period is
/// over. The forecast uses the unrounded daily average.
pub fn aggregate(
    filtered: &FilteredEvents<'_>,
    interval: &Interval,
    kind: Option<RangeKind>,
    now: &DateTime<FixedOffset>,
) -> PeriodStats {
    let total = filtered.len() as u64;

    let mut status_distribution = Distribution::default();
    let mut category_distribution = Distribution::default();
    for matched in filtered.iter() {
        if let Some(status) = &matched.event.status {
            status_distribution.record(status.label());
        }
        if let Some(category) = &matched.event.category {
            category_distribution.record(category.as_str());
        }
    }

    let avg = average_per_day(total, interval);
    let remaining = days_between(now, &interval.end);

    PeriodStats {
        total,
        status_distribution,
        category_distribution,
        buckets: bucketize(filtered, interval, kind),
        avg_per_day: round1(avg),
        predicted_total: forecast(total, avg, remaining),
        interval: *interval,
        skipped: filtered.skipped,
    }
}

/// Unrounded events per day over the interval's inclusive day count
pub fn average_per_day(total: u64, interval: &Interval) -> f64 {
    total as f64 / interval.days() as f64
}

/// Linear forecast: observed total plus the daily rate over the remaining days
pub fn forecast(total: u64, avg_per_day: f64, days_remaining: i64) -> f64 {
    round1(total as f64 + avg_per_day * days_remaining as f64)
}

/// Round to one decimal place, half away from zero
///
/// Non-finite input yields 0.0 so it never reaches the output. A result that
/// rounds to zero is always `+0.0`, never `-0.0`.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
