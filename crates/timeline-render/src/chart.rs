//! SVG scatter chart: date on the x axis, time of day on the y axis.
//!
//! Markers and date ticks carry their position along the date axis as a
//! `data-x` fraction of the display window, which the page script uses to
//! zoom into a date range.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use timeline_core::FilteredCommit;
use timeline_history::{CommitDataset, DisplayWindow};

/// Plotly's qualitative palette; repositories cycle through it.
const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

pub(crate) const WIDTH: f64 = 1200.0;
pub(crate) const HEIGHT: f64 = 640.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MINUTES_PER_DAY: f64 = 1440.0;

/// Maximum number of date labels on the x axis.
const MAX_DATE_TICKS: i64 = 15;

/// A repository's position in the legend and its colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesKey {
    /// Group label the repository belongs to.
    pub group: String,
    /// Repository display name.
    pub repo: String,
    /// Index used for the CSS class and colour.
    pub index: usize,
    /// Fill colour.
    pub color: &'static str,
}

/// Assign a colour to every repository, in presentation order.
pub fn series(dataset: &CommitDataset) -> Vec<SeriesKey> {
    dataset
        .repositories()
        .into_iter()
        .enumerate()
        .map(|(index, (group, repo))| SeriesKey {
            group: group.to_string(),
            repo: repo.to_string(),
            index,
            color: PALETTE[index % PALETTE.len()],
        })
        .collect()
}

/// Marker radius in pixels for a commit.
pub fn marker_radius(record: &FilteredCommit) -> f64 {
    3.0 + 2.0 * f64::from(record.change_size.weight())
}

/// Render the chart as a standalone `<svg>` element.
pub fn render_svg(dataset: &CommitDataset, window: DisplayWindow, keys: &[SeriesKey]) -> String {
    let plot = Plot::new(window);
    let lookup: BTreeMap<(&str, &str), &SeriesKey> = keys
        .iter()
        .map(|k| ((k.group.as_str(), k.repo.as_str()), k))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="100%" role="img" data-left="{:.1}" data-width="{:.1}">"#,
        MARGIN_LEFT,
        plot.width()
    );
    let _ = writeln!(
        out,
        r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#f7f8fb" stroke="#d0d4dc"/>"##,
        MARGIN_LEFT,
        MARGIN_TOP,
        plot.width(),
        plot.height()
    );

    write_hour_axis(&mut out, &plot);
    write_date_axis(&mut out, &plot);

    let mut skipped = 0usize;
    for record in dataset.presentation() {
        let Some(ts) = record.commit.timestamp else {
            continue;
        };
        if ts < window.start || ts > window.end {
            skipped += 1;
            continue;
        }
        let Some(key) = lookup.get(&(record.group_label.as_str(), record.repo_display_name.as_str()))
        else {
            continue;
        };

        let short_hash = &record.commit.hash[..record.commit.hash.len().min(8)];
        let _ = writeln!(
            out,
            r#"<circle class="commit repo-{}" data-x="{:.5}" cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.75"><title>{} ({}) {}&#10;{} {} · {} lines ({})&#10;{}</title></circle>"#,
            key.index,
            plot.fraction(ts),
            plot.x(ts),
            plot.y(ts),
            marker_radius(record),
            key.color,
            escape(&record.repo_display_name),
            escape(&record.branch_name),
            short_hash,
            ts.format("%Y-%m-%d"),
            record.time_of_day,
            record.commit.total_changed_lines,
            record.change_size,
            escape(&record.commit.message),
        );
    }
    if skipped > 0 {
        tracing::debug!(skipped, "commits outside the display window were not drawn");
    }

    out.push_str("</svg>\n");
    out
}

fn write_hour_axis(out: &mut String, plot: &Plot) {
    for hour in (0..=24).step_by(2) {
        let y = plot.y_minutes(f64::from(hour) * 60.0);
        let _ = writeln!(
            out,
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e3e6ec"/><text x="{:.1}" y="{:.1}" text-anchor="end" class="tick">{hour:02}:00</text>"##,
            MARGIN_LEFT,
            MARGIN_LEFT + plot.width(),
            MARGIN_LEFT - 8.0,
            y + 4.0,
        );
    }
    let _ = writeln!(
        out,
        r#"<text x="16" y="{:.1}" transform="rotate(-90 16 {:.1})" text-anchor="middle" class="axis-title">Time of day</text>"#,
        MARGIN_TOP + plot.height() / 2.0,
        MARGIN_TOP + plot.height() / 2.0,
    );
}

fn write_date_axis(out: &mut String, plot: &Plot) {
    let days = (plot.window.end - plot.window.start).num_days().max(1);
    let step = (days + MAX_DATE_TICKS - 1) / MAX_DATE_TICKS;

    let mut day = start_of_day(plot.window.start);
    if day < plot.window.start {
        day += Duration::days(1);
    }
    while day <= plot.window.end {
        let _ = writeln!(
            out,
            r##"<g class="date-tick" data-x="{:.5}" transform="translate({:.1} 0)"><line x1="0" y1="{:.1}" x2="0" y2="{:.1}" stroke="#e3e6ec"/><text x="0" y="{:.1}" text-anchor="middle" class="tick">{}</text></g>"##,
            plot.fraction(day),
            plot.x(day),
            MARGIN_TOP,
            MARGIN_TOP + plot.height(),
            MARGIN_TOP + plot.height() + 18.0,
            day.format("%Y-%m-%d"),
        );
        day += Duration::days(step);
    }
    let _ = writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="axis-title">Date</text>"#,
        MARGIN_LEFT + plot.width() / 2.0,
        HEIGHT - 12.0,
    );
}

/// Midnight of the day containing `ts`, in the same offset.
fn start_of_day(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts - Duration::seconds(i64::from(ts.num_seconds_from_midnight()))
}

struct Plot {
    window: DisplayWindow,
}

impl Plot {
    fn new(window: DisplayWindow) -> Self {
        Self { window }
    }

    fn width(&self) -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn height(&self) -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    /// Position of `ts` in the window: 0 at the start, 1 at the end.
    fn fraction(&self, ts: DateTime<FixedOffset>) -> f64 {
        let span = (self.window.end - self.window.start).num_seconds().max(1) as f64;
        let offset = (ts - self.window.start).num_seconds() as f64;
        offset / span
    }

    fn x(&self, ts: DateTime<FixedOffset>) -> f64 {
        MARGIN_LEFT + self.width() * self.fraction(ts)
    }

    fn y(&self, ts: DateTime<FixedOffset>) -> f64 {
        self.y_minutes(f64::from(ts.hour() * 60 + ts.minute()))
    }

    /// Midnight at the bottom, the end of the day at the top.
    fn y_minutes(&self, minutes: f64) -> f64 {
        MARGIN_TOP + self.height() * (1.0 - minutes / MINUTES_PER_DAY)
    }
}

/// Escape text for use inside HTML/SVG element content and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
