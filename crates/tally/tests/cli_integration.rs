//! End-to-end tests for the tally binary
//!
//! These run the built executable against temporary export files and check
//! the report on stdout.

use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::NamedTempFile;

const APPOINTMENTS: &str = r#"[
    {"_id": "1", "appointmentDateTime": "2024-03-05T10:00:00", "status": "Completed"},
    {"_id": "2", "appointmentDateTime": "2024-03-05T14:00:00", "status": "Cancelled"},
    {"_id": "3", "appointmentDateTime": "2024-03-06T09:00:00", "status": "Completed"},
    {"_id": "4", "appointmentDateTime": "2024-03-04T11:00:00", "status": "Completed"},
    {"_id": "5", "appointmentDateTime": "someday", "status": "Upcoming"}
]"#;

fn export(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}

fn tally(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tally"))
        .args(args)
        .output()
        .expect("failed to run tally")
}

fn json_stats(file: &NamedTempFile, extra: &[&str]) -> Value {
    let path = file.path().to_str().unwrap();
    let mut args = vec!["stats", "--events", path, "--format", "json"];
    args.extend_from_slice(extra);

    let output = tally(&args);
    assert!(
        output.status.success(),
        "tally failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_day_with_custom_comparison() {
    let file = export(APPOINTMENTS);
    let json = json_stats(
        &file,
        &[
            "--range",
            "day",
            "--date",
            "2024-03-05",
            "--compare-date",
            "2024-03-04",
            "--now",
            "2024-03-05T18:00:00Z",
        ],
    );

    assert_eq!(json["current"]["total"], 2);
    assert_eq!(json["current"]["statusDistribution"]["Completed"], 1);
    assert_eq!(json["current"]["statusDistribution"]["Cancelled"], 1);
    assert_eq!(json["current"]["skipped"], 1);
    assert_eq!(json["current"]["buckets"]["hourly"].as_array().unwrap().len(), 24);
    assert_eq!(json["baseline"]["total"], 1);
    assert_eq!(json["deltaPercent"]["total"], 100.0);
}

#[test]
fn test_month_without_comparison() {
    let file = export(APPOINTMENTS);
    let json = json_stats(
        &file,
        &["-r", "month", "-d", "2024-02-01", "--now", "2024-02-10T12:00:00Z"],
    );

    assert_eq!(json["current"]["total"], 0);
    assert_eq!(json["current"]["avgPerDay"], 0.0);
    assert_eq!(json["current"]["predictedTotal"], 0.0);
    assert_eq!(json["current"]["buckets"]["daily"].as_array().unwrap().len(), 29);
    assert!(json["baseline"].is_null());
}

#[test]
fn test_paginated_envelope() {
    let file = export(
        r#"{"count": 2, "next": null, "results": [
            {"_id": "s1", "date": "2024-03-05T08:00:00Z", "operation": "restock"},
            {"_id": "s2", "date": "2024-03-05T09:00:00Z", "operation": "sale"}
        ]}"#,
    );
    let json = json_stats(&file, &["-d", "2024-03-05", "--now", "2024-03-05T18:00:00Z"]);

    assert_eq!(json["current"]["total"], 2);
    assert_eq!(json["current"]["categoryDistribution"]["restock"], 1);
}

#[test]
fn test_config_sets_zone_and_defaults() {
    let file = export(APPOINTMENTS);
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        "[analytics]\nutc_offset = \"+00:00\"\ndefault_range = \"week\"\ncompare = \"previous_period\""
    )
    .unwrap();

    let json = json_stats(
        &file,
        &[
            "--config",
            config.path().to_str().unwrap(),
            "--now",
            "2024-03-06T12:00:00Z",
        ],
    );

    // Calendar week Sun Mar 3 - Sat Mar 9
    let start = json["current"]["interval"]["start"].as_str().unwrap();
    assert!(start.starts_with("2024-03-03T00:00:00"), "{start}");
    assert_eq!(json["current"]["total"], 4);
    assert_eq!(json["current"]["buckets"]["daily"].as_array().unwrap().len(), 7);
    assert_eq!(json["baseline"]["total"], 0);
    assert!(json["deltaPercent"]["total"].is_null());
}

#[test]
fn test_config_week_starts_on_monday() {
    let file = export(APPOINTMENTS);
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        "[analytics]\ndefault_range = \"week\"\nweek_starts_on = \"monday\""
    )
    .unwrap();

    // Sunday Mar 10 closes the Monday-based week of Mar 4
    let json = json_stats(
        &file,
        &[
            "--config",
            config.path().to_str().unwrap(),
            "--date",
            "2024-03-10",
            "--now",
            "2024-03-10T12:00:00Z",
        ],
    );

    let start = json["current"]["interval"]["start"].as_str().unwrap();
    assert!(start.starts_with("2024-03-04T00:00:00"), "{start}");
    assert_eq!(json["current"]["total"], 4);
}

#[test]
fn test_record_with_null_timestamp_is_skipped() {
    let file = export(
        r#"[
            {"_id": 1, "appointmentDateTime": "2024-03-05T10:00:00", "status": "Completed"},
            {"_id": 2, "appointmentDateTime": null, "status": "Completed"}
        ]"#,
    );
    let json = json_stats(&file, &["-d", "2024-03-05", "--now", "2024-03-05T18:00:00Z"]);

    assert_eq!(json["current"]["total"], 1);
    assert_eq!(json["current"]["skipped"], 1);
}

#[test]
fn test_text_report() {
    let file = export(APPOINTMENTS);
    let output = tally(&[
        "stats",
        "--events",
        file.path().to_str().unwrap(),
        "--date",
        "2024-03-05",
        "--compare-date",
        "2024-03-04",
        "--now",
        "2024-03-05T18:00:00Z",
        "--no-color",
    ]);

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("March 5, 2024 vs March 4, 2024"));
    assert!(text.contains("+100%"));
    assert!(text.contains("By hour"));
}

#[test]
fn test_missing_events_file_fails() {
    let output = tally(&["stats", "--events", "/nonexistent/events.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}

#[test]
fn test_bad_range_fails() {
    let file = export("[]");
    let output = tally(&[
        "stats",
        "--events",
        file.path().to_str().unwrap(),
        "--range",
        "fortnight",
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("fortnight"));
}
