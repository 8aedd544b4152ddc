//! Analytics entry point
//!
//! `AnalyticsEngine` wires the stages together: resolve the period, filter
//! the events, aggregate, and optionally compare against a baseline. It
//! holds configuration only; every call is a pure function of its inputs.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::compare::{CompareMode, ComparisonResult};
use crate::event::Event;
use crate::filter::EventFilter;
use crate::stats::{PeriodStats, aggregate};
use crate::timerange::{
    Interval, PeriodMode, PeriodParams, PeriodResolver, RangeKind, WeekStart, previous_anchor,
};

/// Everything one analytics view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Range kind (`None` falls back to a single day)
    pub range: Option<RangeKind>,
    /// Anchor of the current period
    pub current: PeriodParams,
    /// How the baseline is chosen
    #[serde(default)]
    pub compare: CompareMode,
    /// Anchor of the baseline for `CompareMode::Custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<PeriodParams>,
    /// Reference instant for fallbacks and forecasts
    pub now: DateTime<FixedOffset>,
}

impl Query {
    /// Create a query without comparison
    pub fn new(
        range: Option<RangeKind>,
        current: PeriodParams,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            range,
            current,
            compare: CompareMode::None,
            comparison: None,
            now,
        }
    }

    /// Compare against a custom anchor
    pub fn with_comparison(mut self, comparison: PeriodParams) -> Self {
        self.compare = CompareMode::Custom;
        self.comparison = Some(comparison);
        self
    }

    /// Set the comparison mode
    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.compare = mode;
        self
    }

    /// Baseline anchor implied by the comparison mode
    pub fn baseline_params(&self) -> Option<PeriodParams> {
        match self.compare {
            CompareMode::None => None,
            CompareMode::Custom => self.comparison,
            CompareMode::PreviousPeriod => Some(PeriodParams::anchored(previous_anchor(
                self.range,
                &self.current,
            ))),
        }
    }
}

/// Aggregation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsEngine {
    resolver: PeriodResolver,
}

impl AnalyticsEngine {
    /// Create an engine from a resolver
    pub fn new(resolver: PeriodResolver) -> Self {
        Self { resolver }
    }

    /// Create an engine for a zone and week convention
    pub fn with_settings(tz: FixedOffset, week_start: WeekStart) -> Self {
        Self::new(PeriodResolver::new(tz, week_start))
    }

    /// Get the period resolver
    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    /// Resolve one period
    pub fn resolve(
        &self,
        range: Option<RangeKind>,
        mode: PeriodMode,
        params: &PeriodParams,
        now: &DateTime<FixedOffset>,
    ) -> Interval {
        self.resolver.resolve(range, mode, params, now)
    }

    /// Aggregate the events of one period
    pub fn period_stats(
        &self,
        events: &[Event],
        range: Option<RangeKind>,
        mode: PeriodMode,
        params: &PeriodParams,
        now: &DateTime<FixedOffset>,
    ) -> PeriodStats {
        let interval = self.resolve(range, mode, params, now);
        self.stats_for(events, &interval, range, now)
    }

    /// Aggregate the events of an already resolved interval
    pub fn stats_for(
        &self,
        events: &[Event],
        interval: &Interval,
        range: Option<RangeKind>,
        now: &DateTime<FixedOffset>,
    ) -> PeriodStats {
        let filtered = EventFilter::new(*interval).apply(events, self.resolver.timezone());
        let stats = aggregate(&filtered, interval, range, now);

        tracing::debug!(
            range = range.map(|r| r.as_str()).unwrap_or("default"),
            start = %interval.start,
            end = %interval.end,
            total = stats.total,
            skipped = stats.skipped,
            "aggregated period"
        );

        stats
    }

    /// Aggregate the current period and, if requested, the baseline
    pub fn compare(&self, events: &[Event], query: &Query) -> ComparisonResult {
        let current = self.period_stats(
            events,
            query.range,
            PeriodMode::Current,
            &query.current,
            &query.now,
        );

        let baseline_params = query.baseline_params();
        if query.compare == CompareMode::Custom && baseline_params.is_none() {
            tracing::debug!("custom comparison requested without an anchor, skipping baseline");
        }

        let baseline = baseline_params.map(|params| {
            self.period_stats(
                events,
                query.range,
                PeriodMode::Comparison,
                &params,
                &query.now,
            )
        });

        ComparisonResult::new(current, baseline)
    }
}
