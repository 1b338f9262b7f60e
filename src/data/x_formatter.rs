//! Axis label formatting for timestamp (X) and value (Y) axes.
//!
//! Timestamps are plotted as `f64` seconds since the UNIX epoch, computed from
//! the naive wall-clock times in the CSV feeds as if they were UTC. Formatting
//! reverses that mapping, so labels show the wall-clock time written in the
//! source file regardless of the machine's timezone.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

/// Plot X coordinate for a naive timestamp.
pub fn to_plot_x(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp_millis() as f64 / 1_000.0
}

/// Naive timestamp for a plot X coordinate. Non-finite or out-of-range values
/// fall back to the UNIX epoch.
pub fn from_plot_x(x: f64) -> NaiveDateTime {
    let ms = if x.is_finite() { (x * 1_000.0).round() as i64 } else { 0 };
    DateTime::from_timestamp_millis(ms)
        .or_else(|| DateTime::from_timestamp_millis(0))
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// TimeAxisFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Granularity of the time portion of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeResolution {
    /// `HH:MM`
    Minutes,
    /// `HH:MM:SS`
    Seconds,
}

/// Timestamp formatter for tick labels and hover readouts.
///
/// * The date (`MM-DD`) is shown only when the visible range crosses midnight,
///   or when [`force_date_visible`](Self::force_date_visible) is set.
/// * The year is added when the range crosses a year boundary.
/// * Seconds are shown when the visible span is below
///   [`seconds_threshold`](Self::seconds_threshold) or the value itself is
///   not on a whole minute.
#[derive(Debug, Clone)]
pub struct TimeAxisFormatter {
    pub force_date_visible: bool,
    /// Visible span (seconds) below which seconds are always shown. Default: 2 hours.
    pub seconds_threshold: f64,
}

impl Default for TimeAxisFormatter {
    fn default() -> Self {
        Self {
            force_date_visible: false,
            seconds_threshold: 7_200.0,
        }
    }
}

impl TimeAxisFormatter {
    /// Format plot X value `x` given the visible X range.
    pub fn format(&self, x: f64, range: (f64, f64)) -> String {
        let (lo, hi) = if range.0 <= range.1 {
            (range.0, range.1)
        } else {
            (range.1, range.0)
        };
        let start = from_plot_x(lo);
        let end = from_plot_x(hi);
        let value = from_plot_x(x);

        let show_date = self.force_date_visible || start.date() != end.date();
        let show_year = show_date && start.year() != end.year();

        let time_fmt = match self.determine_resolution(hi - lo) {
            TimeResolution::Seconds => "%H:%M:%S",
            TimeResolution::Minutes if value.second() != 0 => "%H:%M:%S",
            TimeResolution::Minutes => "%H:%M",
        };
        let date_fmt = match (show_date, show_year) {
            (true, true) => "%Y-%m-%d ",
            (true, false) => "%m-%d ",
            _ => "",
        };
        value.format(&format!("{date_fmt}{time_fmt}")).to_string()
    }

    pub fn determine_resolution(&self, span_secs: f64) -> TimeResolution {
        if span_secs < self.seconds_threshold {
            TimeResolution::Seconds
        } else {
            TimeResolution::Minutes
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ValueFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Y-axis tick labels: fixed decimals derived from the grid step, with an
/// optional unit suffix.
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    pub unit: Option<String>,
}

impl ValueFormatter {
    pub fn with_unit<S: Into<String>>(unit: S) -> Self {
        Self {
            unit: Some(unit.into()),
        }
    }

    pub fn format(&self, value: f64, step: f64) -> String {
        let decimals = if step.is_finite() && step > 0.0 && step < 1.0 {
            (-step.log10()).ceil().clamp(0.0, 6.0) as usize
        } else {
            0
        };
        match &self.unit {
            Some(u) => format!("{value:.decimals$} {u}"),
            None => format!("{value:.decimals$}"),
        }
    }
}
