//! Output formatting for stats reports
//!
//! Text is meant for a terminal; JSON carries the full `ComparisonResult`
//! with camelCase keys.

use owo_colors::{OwoColorize, Style};
use tally_analytics::{
    Bucket, ComparisonResult, Distribution, PeriodStats, RangeKind, Trend, format_delta,
};

/// Widest chart bar, in cells
const BAR_WIDTH: u64 = 40;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable report (default)
    Text,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    Compact,
}

impl Format {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" | "t" => Format::Text,
            "json" | "j" => Format::Json,
            "compact" | "c" => Format::Compact,
            _ => Format::Text, // Text is default for human readability
        }
    }
}

/// Color styles for terminal output
struct ColorStyles {
    heading: Style,
    label: Style,
    up: Style,
    down: Style,
    bar: Style,
}

impl ColorStyles {
    fn new() -> Self {
        Self {
            heading: Style::new().bold(),
            label: Style::new().dimmed(),
            up: Style::new().green(),
            down: Style::new().red(),
            bar: Style::new().cyan(),
        }
    }
}

/// Report formatter
pub struct Formatter {
    format: Format,
    use_color: bool,
    styles: ColorStyles,
}

impl Formatter {
    /// Create a new formatter
    pub fn new(format: &str) -> Self {
        Self {
            format: Format::from_str(format),
            use_color: true, // Default on, caller sets based on TTY
            styles: ColorStyles::new(),
        }
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Print a report to stdout
    pub fn print(
        &self,
        result: &ComparisonResult,
        range: Option<RangeKind>,
    ) -> anyhow::Result<()> {
        match self.format {
            Format::Text => print!("{}", self.render_text(result, range)),
            Format::Json => println!("{}", serde_json::to_string_pretty(result)?),
            Format::Compact => println!("{}", serde_json::to_string(result)?),
        }
        Ok(())
    }

    /// Render the text report
    pub fn render_text(&self, result: &ComparisonResult, range: Option<RangeKind>) -> String {
        let current = &result.current;
        let baseline = result.baseline.as_ref();
        let deltas = &result.delta_percent;
        let mut out = String::new();

        let mut title = current.interval.label(range);
        if let Some(baseline) = baseline {
            title = format!("{} vs {}", title, baseline.interval.label(range));
        }
        out.push_str(&self.paint(&title, self.styles.heading));
        out.push_str("\n\n");

        let rows = [
            (
                "Total",
                "total",
                current.total.to_string(),
                baseline.map(|b| b.total.to_string()),
            ),
            (
                "Avg per day",
                "avgPerDay",
                format!("{:.1}", current.avg_per_day),
                baseline.map(|b| format!("{:.1}", b.avg_per_day)),
            ),
            (
                "Predicted",
                "predictedTotal",
                format!("{:.1}", current.predicted_total),
                baseline.map(|b| format!("{:.1}", b.predicted_total)),
            ),
        ];
        for (label, metric, value, previous) in rows {
            out.push_str(&format!("  {}{:>8}", self.label(label, 14), value));
            if let Some(previous) = previous {
                out.push_str(&format!(
                    "  {}  ({})",
                    self.delta(deltas.get(metric), result.trend(metric)),
                    previous
                ));
            }
            out.push('\n');
        }

        let statuses = status_rows(current, baseline);
        if !statuses.is_empty() {
            out.push('\n');
            out.push_str(&self.paint("Status", self.styles.heading));
            out.push('\n');
            for label in statuses {
                let count = current.status_distribution.count(&label);
                out.push_str(&format!(
                    "  {}{:>8}{:>6}",
                    self.label(&label, 14),
                    count,
                    share(&current.status_distribution, &label, current.total)
                ));
                if baseline.is_some() {
                    out.push_str(&format!(
                        "  {}",
                        self.delta(deltas.get(&label), result.trend(&label))
                    ));
                }
                out.push('\n');
            }
        }

        if !current.category_distribution.is_empty() {
            out.push('\n');
            out.push_str(&self.paint("Categories", self.styles.heading));
            out.push('\n');
            for (label, count) in current.category_distribution.iter() {
                out.push_str(&format!(
                    "  {}{:>8}{:>6}\n",
                    self.label(label, 14),
                    count,
                    share(&current.category_distribution, label, current.total)
                ));
            }
        }

        let (heading, series) = chart_series(current, range);
        out.push('\n');
        out.push_str(&self.paint(heading, self.styles.heading));
        out.push('\n');
        let max = series.iter().map(|b| b.count).max().unwrap_or(0);
        for bucket in series {
            out.push_str(&format!(
                "  {}{:>6}  {}\n",
                self.label(&bucket.key, 14),
                bucket.count,
                self.paint(&bar(bucket.count, max), self.styles.bar)
            ));
        }

        if current.skipped > 0 {
            out.push('\n');
            out.push_str(&self.paint(
                &format!(
                    "Skipped {} record(s) with an unreadable timestamp",
                    current.skipped
                ),
                self.styles.label,
            ));
            out.push('\n');
        }

        out
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.use_color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn label(&self, text: &str, width: usize) -> String {
        self.paint(&format!("{:<width$}", text, width = width), self.styles.label)
    }

    /// Delta cell, colored by the direction of the underlying values
    fn delta(&self, delta: Option<f64>, trend: Option<Trend>) -> String {
        let text = format!("{:>8}", format_delta(delta));
        match trend {
            Some(Trend::Up) => self.paint(&text, self.styles.up),
            Some(Trend::Down) => self.paint(&text, self.styles.down),
            Some(Trend::Flat) | None => text,
        }
    }
}

/// Status labels seen in either period, sorted
fn status_rows(current: &PeriodStats, baseline: Option<&PeriodStats>) -> Vec<String> {
    let mut labels: Vec<String> = current
        .status_distribution
        .labels()
        .chain(baseline.into_iter().flat_map(|b| b.status_distribution.labels()))
        .map(str::to_string)
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

fn share(distribution: &Distribution, label: &str, total: u64) -> String {
    match distribution.share_percent(label, total) {
        Some(percent) => format!("{}%", percent),
        None => "-".to_string(),
    }
}

/// Series shown as the chart: hours for a day, months for a year, days
/// otherwise
fn chart_series(stats: &PeriodStats, range: Option<RangeKind>) -> (&'static str, &[Bucket]) {
    match range {
        Some(RangeKind::Day) | None => ("By hour", stats.buckets.hourly.as_slice()),
        Some(RangeKind::Year) => ("By month", stats.buckets.monthly.as_slice()),
        Some(RangeKind::Week) | Some(RangeKind::Month) => {
            ("By day", stats.buckets.daily.as_slice())
        }
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let cells = (count * BAR_WIDTH).div_ceil(max);
    "#".repeat(cells as usize)
}
