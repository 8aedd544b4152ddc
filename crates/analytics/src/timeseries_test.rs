//! Tests for bucket series

use chrono::{NaiveDate, TimeZone};

use crate::event::Event;
use crate::filter::{FilteredEvents, MatchedEvent, filter_events};
use crate::timerange::{Interval, PeriodMode, PeriodParams, PeriodResolver, RangeKind, utc};
use crate::timeseries::{Bucket, HOURS_PER_DAY, bucketize};

fn interval(kind: RangeKind, y: i32, m: u32, d: u32) -> Interval {
    let now = utc().with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    PeriodResolver::default().resolve(
        Some(kind),
        PeriodMode::Current,
        &PeriodParams::anchored(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        &now,
    )
}

fn count_of(buckets: &[Bucket], key: &str) -> Option<u64> {
    buckets.iter().find(|b| b.key == key).map(|b| b.count)
}

fn scenario_events() -> Vec<Event> {
    vec![
        Event::new("1", "2024-03-05T10:00", "Completed"),
        Event::new("2", "2024-03-05T14:00", "Cancelled"),
        Event::new("3", "2024-03-06T09:00", "Completed"),
    ]
}

#[test]
fn test_day_has_24_hourly_buckets() {
    let events = scenario_events();
    let range = interval(RangeKind::Day, 2024, 3, 5);
    let filtered = filter_events(&events, &range, &utc());

    let series = bucketize(&filtered, &range, Some(RangeKind::Day));

    assert_eq!(series.hourly.len(), HOURS_PER_DAY as usize);
    assert_eq!(count_of(&series.hourly, "10:00"), Some(1));
    assert_eq!(count_of(&series.hourly, "14:00"), Some(1));
    let zeros = series.hourly.iter().filter(|b| b.count == 0).count();
    assert_eq!(zeros, 22);
    assert_eq!(series.dropped, 0);
}

#[test]
fn test_day_zero_fill_without_events() {
    let range = interval(RangeKind::Day, 2024, 3, 5);
    let filtered = filter_events(&[], &range, &utc());

    let series = bucketize(&filtered, &range, Some(RangeKind::Day));

    assert_eq!(series.hourly.len(), 24);
    assert!(series.hourly.iter().all(|b| b.count == 0));
    assert_eq!(series.hourly[0].key, "0:00");
    assert_eq!(series.hourly[23].key, "23:00");
    assert_eq!(series.daily.len(), 1);
}

#[test]
fn test_hourly_order_is_numeric() {
    let range = interval(RangeKind::Day, 2024, 3, 5);
    let series = bucketize(&FilteredEvents::default(), &range, Some(RangeKind::Day));

    let keys: Vec<String> = series.hourly.iter().map(|b| b.key.clone()).collect();
    let expected: Vec<String> = (0..24).map(|h| format!("{}:00", h)).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_month_without_events_leap_february() {
    let range = interval(RangeKind::Month, 2024, 2, 1);
    let series = bucketize(&FilteredEvents::default(), &range, Some(RangeKind::Month));

    assert!(series.hourly.is_empty());
    assert_eq!(series.daily.len(), 29);
    assert!(series.daily.iter().all(|b| b.count == 0));
    assert_eq!(series.daily[0].key, "2024-02-01");
    assert_eq!(series.daily[28].key, "2024-02-29");

    // Feb 1 2024 is in ISO week 5, Feb 29 in week 9
    let weeks: Vec<&str> = series.weekly.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(weeks, vec!["Week 5", "Week 6", "Week 7", "Week 8", "Week 9"]);

    assert_eq!(series.monthly.len(), 1);
    assert_eq!(series.monthly[0].key, "February 2024");
}

#[test]
fn test_daily_counts_cover_total() {
    let events = vec![
        Event::new("1", "2024-03-01T08:00", "Completed"),
        Event::new("2", "2024-03-01T09:00", "Completed"),
        Event::new("3", "2024-03-15T12:00", "Cancelled"),
        Event::new("4", "2024-03-31T23:59:59", "Upcoming"),
        Event::new("5", "2024-04-01T00:00:00", "Upcoming"),
    ];

    for kind in [RangeKind::Week, RangeKind::Month, RangeKind::Year] {
        let range = interval(kind, 2024, 3, 15);
        let filtered = filter_events(&events, &range, &utc());
        let series = bucketize(&filtered, &range, Some(kind));

        assert_eq!(series.daily_total(), filtered.len() as u64, "{:?}", kind);
        assert_eq!(series.dropped, 0);
        let weekly: u64 = series.weekly.iter().map(|b| b.count).sum();
        let monthly: u64 = series.monthly.iter().map(|b| b.count).sum();
        assert_eq!(weekly, filtered.len() as u64);
        assert_eq!(monthly, filtered.len() as u64);
    }
}

#[test]
fn test_daily_order_is_chronological() {
    let events = vec![
        Event::new("1", "2024-03-20T08:00", "Completed"),
        Event::new("2", "2024-03-20T09:00", "Completed"),
        Event::new("3", "2024-03-02T12:00", "Cancelled"),
    ];
    let range = interval(RangeKind::Month, 2024, 3, 1);
    let filtered = filter_events(&events, &range, &utc());
    let series = bucketize(&filtered, &range, Some(RangeKind::Month));

    let keys: Vec<&str> = series.daily.iter().map(|b| b.key.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(count_of(&series.daily, "2024-03-20"), Some(2));
    assert_eq!(count_of(&series.daily, "2024-03-02"), Some(1));
}

#[test]
fn test_year_merges_trailing_iso_week() {
    // Dec 30-31 2024 belong to ISO week 1 of 2025
    let events = vec![Event::new("1", "2024-12-31T10:00", "Completed")];
    let range = interval(RangeKind::Year, 2024, 6, 1);
    let filtered = filter_events(&events, &range, &utc());
    let series = bucketize(&filtered, &range, Some(RangeKind::Year));

    assert_eq!(series.daily.len(), 366);
    assert_eq!(series.monthly.len(), 12);
    assert_eq!(series.weekly.len(), 52);
    assert_eq!(series.weekly[0].key, "Week 1");
    assert_eq!(series.weekly[0].count, 1);
    assert_eq!(series.monthly[11].key, "December 2024");
    assert_eq!(series.monthly[11].count, 1);
}

#[test]
fn test_event_outside_walk_is_dropped() {
    let stray = Event::new("stray", "2024-05-01T10:00", "Completed");
    let at = stray.local_time(&utc()).unwrap();
    let filtered = FilteredEvents {
        events: vec![MatchedEvent { event: &stray, at }],
        skipped: 0,
    };

    let range = interval(RangeKind::Month, 2024, 3, 1);
    let series = bucketize(&filtered, &range, Some(RangeKind::Month));

    assert_eq!(series.dropped, 1);
    assert_eq!(series.daily_total(), 0);
}

#[test]
fn test_bucketize_is_idempotent() {
    let events = scenario_events();
    let range = interval(RangeKind::Week, 2024, 3, 5);
    let filtered = filter_events(&events, &range, &utc());

    let first = bucketize(&filtered, &range, Some(RangeKind::Week));
    let second = bucketize(&filtered, &range, Some(RangeKind::Week));
    assert_eq!(first, second);
}

#[test]
fn test_primary_series() {
    let range = interval(RangeKind::Day, 2024, 3, 5);
    let series = bucketize(&FilteredEvents::default(), &range, Some(RangeKind::Day));
    assert_eq!(series.primary(Some(RangeKind::Day)).len(), 24);
    assert_eq!(series.primary(None).len(), 1);

    let range = interval(RangeKind::Week, 2024, 3, 5);
    let series = bucketize(&FilteredEvents::default(), &range, Some(RangeKind::Week));
    assert_eq!(series.primary(Some(RangeKind::Week)).len(), 7);
}

#[test]
fn test_bucket_serialization() {
    let json = serde_json::to_string(&Bucket::empty("10:00")).unwrap();
    assert_eq!(json, r#"{"key":"10:00","count":0}"#);
}
