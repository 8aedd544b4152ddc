//! Stats command - aggregate an event export for one period
//!
//! Reads a JSON export, resolves the requested period (and an optional
//! baseline) and prints totals, status shares, deltas and the chart series.
//!
//! # Usage
//!
//! ```bash
//! tally stats -e appointments.json                          # today
//! tally stats -e appointments.json -r month -d 2024-03-01   # March 2024
//! tally stats -e stock.json -r week --compare previous      # this week vs last
//! tally stats -e appointments.json -f json > stats.json     # machine-readable
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Args;
use serde::Deserialize;
use tally_analytics::{
    AnalyticsEngine, CompareMode, Event, PeriodParams, Query, RangeKind, parse_date,
    parse_timestamp,
};
use tally_config::Config;

use crate::output::Formatter;

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// JSON export: an array of records or a `{"results": [...]}` page
    #[arg(short, long, value_name = "FILE")]
    events: PathBuf,

    /// Period kind (day, week, month, year). Default from config.
    #[arg(short, long)]
    range: Option<String>,

    /// Anchor date (YYYY-MM-DD). Default: today.
    #[arg(short, long)]
    date: Option<String>,

    /// First day of an explicit week window
    #[arg(long, value_name = "DATE", requires = "end")]
    start: Option<String>,

    /// Last day of an explicit week window
    #[arg(long, value_name = "DATE", requires = "start")]
    end: Option<String>,

    /// Anchor of a custom comparison period (implies --compare custom)
    #[arg(long, value_name = "DATE")]
    compare_date: Option<String>,

    /// Comparison mode (none, previous, custom). Default from config.
    #[arg(long)]
    compare: Option<String>,

    /// Reference time for fallbacks and forecasts. Default: now.
    #[arg(long, value_name = "TIME")]
    now: Option<String>,

    /// Output format (text, json, compact)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Run the stats command
pub fn run(args: StatsArgs, config: &Config) -> Result<()> {
    let events = load_events(&args.events)?;
    let (engine, query) = build_query(&args, config)?;

    let result = engine.compare(&events, &query);
    if result.current.skipped > 0 {
        tracing::warn!(
            skipped = result.current.skipped,
            "some records have unreadable timestamps"
        );
    }

    // Enable color only if: stdout is TTY AND --no-color not set
    let use_color = atty::is(atty::Stream::Stdout) && !args.no_color;
    let formatter = Formatter::new(&args.format).with_color(use_color);
    formatter.print(&result, query.range)
}

/// Export file layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum EventsFile {
    /// Plain array of records
    List(Vec<Event>),
    /// One page of a paginated listing
    Page { results: Vec<Event> },
}

/// Load events from a JSON export
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let file: EventsFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse events from {}", path.display()))?;

    let events = match file {
        EventsFile::List(events) => events,
        EventsFile::Page { results } => results,
    };

    tracing::debug!(path = %path.display(), count = events.len(), "loaded events");
    Ok(events)
}

/// Build the engine and query from arguments, falling back to config
fn build_query(args: &StatsArgs, config: &Config) -> Result<(AnalyticsEngine, Query)> {
    let tz = config.analytics.timezone()?;
    let engine = AnalyticsEngine::with_settings(tz, config.analytics.week_starts_on);

    let range = match &args.range {
        Some(s) => RangeKind::parse(s)?,
        None => config.analytics.default_range,
    };

    let now = match &args.now {
        Some(s) => parse_timestamp(s, &tz)
            .with_context(|| format!("invalid --now value: {} (use RFC 3339)", s))?,
        None => Local::now().with_timezone(&tz),
    };

    let anchor = match &args.date {
        Some(s) => parse_date(s)?,
        None => now.date_naive(),
    };

    let mut current = PeriodParams::anchored(anchor);
    if let (Some(start), Some(end)) = (&args.start, &args.end) {
        if range != RangeKind::Week {
            bail!("--start/--end only apply to --range week");
        }
        current = current.with_week(parse_date(start)?, parse_date(end)?);
    }

    let mut query = Query::new(Some(range), current, now);

    let mode = match &args.compare {
        Some(s) => CompareMode::parse(s)?,
        None if args.compare_date.is_some() => CompareMode::Custom,
        None => config.analytics.compare,
    };
    query = query.with_compare_mode(mode);

    if let Some(s) = &args.compare_date {
        if mode != CompareMode::Custom {
            bail!("--compare-date needs --compare custom");
        }
        query = query.with_comparison(PeriodParams::anchored(parse_date(s)?));
    }

    Ok((engine, query))
}
