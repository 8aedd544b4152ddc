//! Period resolution and calendar calculations
//!
//! Turns a (range kind, mode, anchor) triple into a concrete interval.
//! All boundaries are computed as wall-clock times in a fixed zone.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Granularity of an analytics period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    /// Single calendar day, bucketed by hour
    Day,
    /// Week (explicit bounds for the current period)
    Week,
    /// Calendar month
    Month,
    /// Calendar year
    Year,
}

impl RangeKind {
    /// Parse range kind from string
    ///
    /// Callers that want the documented fallback instead of an error should
    /// use `.ok()` and pass `None` to the resolver.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "today" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            _ => Err(AnalyticsError::InvalidRangeKind(s.to_string())),
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Which side of a comparison is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    /// The period being looked at
    Current,
    /// The baseline it is compared against
    Comparison,
}

/// First day of a calendar week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO-style weeks
    Monday,
    /// Dashboard default, matching an `en` locale calendar
    #[default]
    Sunday,
}

impl WeekStart {
    /// Parse week start from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" | "iso" => Ok(Self::Monday),
            "sunday" | "sun" => Ok(Self::Sunday),
            _ => Err(AnalyticsError::InvalidWeekStart(s.to_string())),
        }
    }

    fn days_into_week(&self, weekday: Weekday) -> i64 {
        let days = match self {
            Self::Monday => weekday.num_days_from_monday(),
            Self::Sunday => weekday.num_days_from_sunday(),
        };
        i64::from(days)
    }
}

/// Anchor for one period
///
/// `week_start`/`week_end` are only read for `RangeKind::Week` in
/// `PeriodMode::Current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodParams {
    /// Reference date
    pub anchor: NaiveDate,
    /// Explicit first day of a week window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    /// Explicit last day of a week window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_end: Option<NaiveDate>,
}

impl PeriodParams {
    /// Anchor on a date with no explicit week bounds
    pub fn anchored(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            week_start: None,
            week_end: None,
        }
    }

    /// Set an explicit week window
    pub fn with_week(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.week_start = Some(start);
        self.week_end = Some(end);
        self
    }
}

/// A resolved period
///
/// Both ends are inclusive for membership tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Start of the period (inclusive)
    pub start: DateTime<FixedOffset>,
    /// End of the period (inclusive)
    pub end: DateTime<FixedOffset>,
}

impl Interval {
    /// Create a new interval
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidInterval(
                "end must not be before start".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Check whether an instant falls inside the interval (both ends inclusive)
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        self.start <= *at && *at <= self.end
    }

    /// Get the duration of this interval
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Get the number of days in this interval (inclusive, at least 1)
    ///
    /// A single day (00:00 to 23:59:59.999) counts as 1.
    pub fn days(&self) -> i64 {
        (days_between(&self.start, &self.end) + 1).max(1)
    }

    /// Iterate over every calendar date the interval touches, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.end.date_naive();
        self.start
            .date_naive()
            .iter_days()
            .take_while(move |d| *d <= last)
    }

    /// Human caption for the period, as used next to comparison values
    ///
    /// - day: `March 5, 2024`
    /// - week: `Mar 3 - Mar 9, 2024`
    /// - month: `March 2024`
    /// - year: `2024`
    pub fn label(&self, kind: Option<RangeKind>) -> String {
        match kind {
            Some(RangeKind::Week) => format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            ),
            Some(RangeKind::Month) => self.start.format("%B %Y").to_string(),
            Some(RangeKind::Year) => self.start.format("%Y").to_string(),
            Some(RangeKind::Day) | None => self.start.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Whole days from `from` to `to`, truncated toward zero
///
/// Negative when `to` is before `from`.
pub fn days_between(from: &DateTime<FixedOffset>, to: &DateTime<FixedOffset>) -> i64 {
    (*to - *from).num_days()
}

/// Resolves period parameters into intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodResolver {
    tz: FixedOffset,
    week_start: WeekStart,
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new(utc(), WeekStart::default())
    }
}

impl PeriodResolver {
    /// Create a resolver for a zone and week convention
    pub fn new(tz: FixedOffset, week_start: WeekStart) -> Self {
        Self { tz, week_start }
    }

    /// Zone used for day boundaries
    pub fn timezone(&self) -> &FixedOffset {
        &self.tz
    }

    /// First day of the week
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Resolve a period
    ///
    /// Never fails: an unknown kind (`None`) resolves to today for the
    /// current period and to yesterday for the comparison period, both
    /// relative to `now`.
    ///
    /// Weeks are asymmetric. The current week uses the caller's explicit
    /// bounds; the comparison week is the calendar week around the anchor.
    pub fn resolve(
        &self,
        kind: Option<RangeKind>,
        mode: PeriodMode,
        params: &PeriodParams,
        now: &DateTime<FixedOffset>,
    ) -> Interval {
        let anchor = params.anchor;

        let (first, last) = match (kind, mode) {
            (Some(RangeKind::Day), _) => (anchor, anchor),
            (Some(RangeKind::Week), PeriodMode::Current) => {
                let first = params
                    .week_start
                    .unwrap_or_else(|| self.start_of_week(anchor));
                let last = params
                    .week_end
                    .unwrap_or_else(|| self.end_of_week(anchor));
                if last < first {
                    (last, first)
                } else {
                    (first, last)
                }
            }
            (Some(RangeKind::Week), PeriodMode::Comparison) => {
                (self.start_of_week(anchor), self.end_of_week(anchor))
            }
            (Some(RangeKind::Month), _) => (start_of_month(anchor), end_of_month(anchor)),
            (Some(RangeKind::Year), _) => (start_of_year(anchor), end_of_year(anchor)),
            (None, mode) => {
                let today = now.with_timezone(&self.tz).date_naive();
                let day = match mode {
                    PeriodMode::Current => today,
                    PeriodMode::Comparison => today.pred_opt().unwrap_or(today),
                };
                tracing::debug!(%day, ?mode, "no range kind, falling back to single day");
                (day, day)
            }
        };

        Interval {
            start: self.start_of_day(first),
            end: self.end_of_day(last),
        }
    }

    /// Midnight at the start of a date
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        local_datetime(date.and_time(NaiveTime::MIN), &self.tz)
    }

    /// Last millisecond of a date
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        local_datetime(date.and_time(last_millisecond()), &self.tz)
    }

    /// First day of the calendar week containing `date`
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(self.week_start.days_into_week(date.weekday()))
    }

    /// Last day of the calendar week containing `date`
    pub fn end_of_week(&self, date: NaiveDate) -> NaiveDate {
        self.start_of_week(date) + Duration::days(6)
    }
}

/// Anchor of the period right before the one described by `params`
///
/// Days step back one day, weeks seven days from the window start, months
/// and years by calendar (Mar 31 -> Feb 29 in a leap year). With no kind the
/// fallback comparison is already "yesterday", so the anchor is unchanged.
pub fn previous_anchor(kind: Option<RangeKind>, params: &PeriodParams) -> NaiveDate {
    let anchor = params.anchor;
    match kind {
        Some(RangeKind::Day) => anchor.pred_opt().unwrap_or(anchor),
        Some(RangeKind::Week) => params.week_start.unwrap_or(anchor) - Duration::days(7),
        Some(RangeKind::Month) => shift_months(anchor, -1),
        Some(RangeKind::Year) => shift_months(anchor, -12),
        None => anchor,
    }
}

/// Shift a date by a number of months (positive or negative)
///
/// If the target day doesn't exist (e.g., Mar 31 - 1 month), uses the last
/// day of the target month.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total_months = date.month() as i32 + months;
    let year_delta = if total_months <= 0 {
        (total_months - 12) / 12
    } else {
        (total_months - 1) / 12
    };

    let new_year = date.year() + year_delta;
    let new_month = ((total_months - 1).rem_euclid(12) + 1) as u32;

    NaiveDate::from_ymd_opt(new_year, new_month, 1)
        .and_then(|first| first.with_day(date.day()).or_else(|| last_day_of_month(first)))
        .unwrap_or(date)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AnalyticsError::InvalidDate(s.to_string()))
}

/// Parse a UTC offset: `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let invalid = || AnalyticsError::InvalidOffset(s.to_string());
    let trimmed = s.trim();

    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// UTC as a fixed offset
pub fn utc() -> FixedOffset {
    Utc.fix()
}

fn last_millisecond() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn local_datetime(naive: NaiveDateTime, tz: &FixedOffset) -> DateTime<FixedOffset> {
    tz.from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    last_day_of_month(date).unwrap_or(date)
}

fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// Get the last day of the month for a given date
fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = (date.year(), date.month());
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month.map(|d| d - Duration::days(1))
}
