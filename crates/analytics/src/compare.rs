//! Current-vs-baseline comparison
//!
//! Relative deltas between two aggregated periods. A delta is `None` when
//! there is no baseline or the baseline value is zero; presentation renders
//! that as the `+100%` sentinel rather than `0%` or infinity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::stats::{PeriodStats, round1};

/// Label shown for a delta without a usable baseline
pub const NO_BASELINE: &str = "+100%";

/// How the baseline period is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// No baseline
    #[default]
    None,
    /// The period right before the current one
    PreviousPeriod,
    /// A caller-chosen anchor
    Custom,
}

impl CompareMode {
    /// Parse comparison mode from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "previous_period" | "previous" | "prev" => Ok(Self::PreviousPeriod),
            "custom" => Ok(Self::Custom),
            _ => Err(AnalyticsError::InvalidCompareMode(s.to_string())),
        }
    }

    /// Check if a baseline is requested
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Percent deltas per metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deltas {
    /// Change in event count
    pub total: Option<f64>,
    /// Change in daily average
    pub avg_per_day: Option<f64>,
    /// Change in forecast
    pub predicted_total: Option<f64>,
    /// Change per status label seen in either period
    pub by_status: BTreeMap<String, Option<f64>>,
}

impl Deltas {
    /// Look up a delta by metric name (`total`, `avgPerDay`,
    /// `predictedTotal`) or status label
    pub fn get(&self, metric: &str) -> Option<f64> {
        match metric {
            "total" => self.total,
            "avgPerDay" => self.avg_per_day,
            "predictedTotal" => self.predicted_total,
            status => self.by_status.get(status).copied().flatten(),
        }
    }
}

/// Current period stats with an optional baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// The period being looked at
    pub current: PeriodStats,
    /// The comparison period, if one was requested
    pub baseline: Option<PeriodStats>,
    /// Relative change from baseline to current, in percent
    pub delta_percent: Deltas,
}

impl ComparisonResult {
    /// Combine two aggregated periods
    pub fn new(current: PeriodStats, baseline: Option<PeriodStats>) -> Self {
        let delta_percent = deltas(&current, baseline.as_ref());
        Self {
            current,
            baseline,
            delta_percent,
        }
    }

    /// Trend of a metric or status against the baseline
    pub fn trend(&self, metric: &str) -> Option<Trend> {
        let baseline = self.baseline.as_ref()?;
        let (current, previous) = match metric {
            "total" => (self.current.total as f64, baseline.total as f64),
            "avgPerDay" => (self.current.avg_per_day, baseline.avg_per_day),
            "predictedTotal" => (self.current.predicted_total, baseline.predicted_total),
            status => (
                self.current.status_distribution.count(status) as f64,
                baseline.status_distribution.count(status) as f64,
            ),
        };
        Some(Trend::between(current, previous))
    }
}

/// Direction of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Current is higher
    Up,
    /// Current is lower
    Down,
    /// No change
    Flat,
}

impl Trend {
    /// Compare two values
    pub fn between(current: f64, baseline: f64) -> Self {
        if current > baseline {
            Self::Up
        } else if current < baseline {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Percent change from `baseline` to `current`, rounded to one decimal
///
/// `None` when the baseline is zero or either value is not finite.
pub fn percent_change(current: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 || !baseline.is_finite() || !current.is_finite() {
        return None;
    }
    Some(round1((current - baseline) / baseline * 100.0))
}

/// Render a delta: `+25.0%`, `-20.0%`, or the `+100%` sentinel for `None`
pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(value) if value >= 0.0 => format!("+{:.1}%", value),
        Some(value) => format!("{:.1}%", value),
        None => NO_BASELINE.to_string(),
    }
}

fn deltas(current: &PeriodStats, baseline: Option<&PeriodStats>) -> Deltas {
    let Some(baseline) = baseline else {
        let by_status = current
            .status_distribution
            .labels()
            .map(|label| (label.to_string(), None))
            .collect();
        return Deltas {
            by_status,
            ..Deltas::default()
        };
    };

    let mut by_status = BTreeMap::new();
    for label in current
        .status_distribution
        .labels()
        .chain(baseline.status_distribution.labels())
    {
        if by_status.contains_key(label) {
            continue;
        }
        let delta = percent_change(
            current.status_distribution.count(label) as f64,
            baseline.status_distribution.count(label) as f64,
        );
        by_status.insert(label.to_string(), delta);
    }

    Deltas {
        total: percent_change(current.total as f64, baseline.total as f64),
        avg_per_day: percent_change(current.avg_per_day, baseline.avg_per_day),
        predicted_total: percent_change(current.predicted_total, baseline.predicted_total),
        by_status,
    }
}
