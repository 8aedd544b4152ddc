//! Tests for event filtering

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::event::{Event, EventStatus};
use crate::filter::{EventFilter, filter_events};
use crate::timerange::{Interval, utc};

fn at(d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    utc().with_ymd_and_hms(2024, 3, d, h, min, 0).unwrap()
}

fn march_5() -> Interval {
    let end = utc().with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
    Interval::new(at(5, 0, 0), end).unwrap()
}

fn sample() -> Vec<Event> {
    vec![
        Event::new("1", "2024-03-05T10:00", "Completed"),
        Event::new("2", "2024-03-05T14:00", "Cancelled").with_category("haircut"),
        Event::new("3", "2024-03-06T09:00", "Completed"),
        Event::new("4", "2024-03-04T23:59:59", "Upcoming"),
    ]
}

#[test]
fn test_filter_by_interval() {
    let events = sample();
    let filtered = filter_events(&events, &march_5(), &utc());

    assert_eq!(filtered.len(), 2);
    let ids: Vec<&str> = filtered.iter().map(|m| m.event.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(filtered.skipped, 0);
}

#[test]
fn test_filter_empty_input() {
    let filtered = filter_events(&[], &march_5(), &utc());
    assert!(filtered.is_empty());
    assert_eq!(filtered.skipped, 0);
}

#[test]
fn test_filter_bounds_are_inclusive() {
    let events = vec![
        Event::new("start", "2024-03-05T00:00:00", "Completed"),
        Event::new("end", "2024-03-05T23:59:59", "Completed"),
        Event::new("after", "2024-03-06T00:00:00", "Completed"),
    ];
    let filtered = filter_events(&events, &march_5(), &utc());
    assert_eq!(filtered.len(), 2);
}

#[test]
fn test_filter_zero_length_interval() {
    let instant = at(5, 10, 0);
    let interval = Interval::new(instant, instant).unwrap();
    let events = vec![
        Event::new("exact", "2024-03-05T10:00:00Z", "Completed"),
        Event::new("later", "2024-03-05T10:00:01Z", "Completed"),
    ];

    let filtered = filter_events(&events, &interval, &utc());
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.events[0].event.id, "exact");
}

#[test]
fn test_filter_skips_malformed_timestamps() {
    let mut events = sample();
    events.push(Event::new("bad", "yesterday-ish", "Completed"));
    events.push(Event::new("empty", "", "Completed"));

    let filtered = filter_events(&events, &march_5(), &utc());
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.skipped, 2);
}

#[test]
fn test_filter_keeps_parsed_time() {
    let tz = FixedOffset::east_opt(3600).unwrap();
    let events = vec![Event::new("1", "2024-03-05T09:30:00Z", "Completed")];
    let interval = Interval::new(
        tz.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        tz.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap(),
    )
    .unwrap();

    let filtered = filter_events(&events, &interval, &tz);
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        filtered.events[0].at,
        tz.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap()
    );
}

#[test]
fn test_filter_by_status() {
    let events = sample();
    let filtered = EventFilter::new(march_5())
        .with_status(EventStatus::Cancelled)
        .apply(&events, &utc());

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.events[0].event.id, "2");
}

#[test]
fn test_filter_by_category() {
    let events = sample();
    let filtered = EventFilter::new(march_5())
        .with_category("haircut")
        .apply(&events, &utc());
    assert_eq!(filtered.len(), 1);

    let none = EventFilter::new(march_5())
        .with_category("colour")
        .apply(&events, &utc());
    assert!(none.is_empty());
}

#[test]
fn test_filter_does_not_mutate_input() {
    let events = sample();
    let before = events.clone();
    let _ = filter_events(&events, &march_5(), &utc());
    assert_eq!(events, before);
}
