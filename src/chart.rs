//! Chart specifications: what to draw, independent of how it is drawn.
//!
//! A [`ChartSpec`] is a plain value (comparable, serializable) built from
//! transformed tables by the builder functions in this module. Drawing happens
//! in [`crate::plot`]. Building never fails on empty input: an empty series is
//! kept as an empty trace.
//!
//! Dual y-axes are expressed by tagging series with [`YAxisSide::Secondary`].
//! For drawing, secondary values are mapped linearly onto the primary range via
//! [`AxisMapping`]; the right-hand axis labels apply the inverse mapping.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::data::table::Table;
use crate::data::trace_look::{LineDash, Rgba, SeriesLook};
use crate::data::transform::{filter_date_range, Bucket};
use crate::data::x_formatter::to_plot_x;
use crate::error::DashboardResult;

/// Name of the static forecast series on the live chart.
pub const FORECAST_SERIES: &str = "Forecast generation";
/// Name of the refreshing live series on the live chart.
pub const LIVE_SERIES: &str = "Live generation (avg)";
/// Name of the single-point overlay marking the newest live point.
pub const HIGHLIGHT_SERIES: &str = "Latest";

const GENERATION_AXIS: &str = "Generation (W)";

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YAxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub title: String,
    /// Fixed `(min, max)`. `None` fits the data.
    pub range: Option<(f64, f64)>,
    pub show_grid: bool,
}

impl AxisSpec {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            range: None,
            show_grid: true,
        }
    }

    pub fn fixed(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn without_grid(mut self) -> Self {
        self.show_grid = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    /// `[x, y]` with x in plot seconds (see [`to_plot_x`]).
    pub points: Vec<[f64; 2]>,
    pub look: SeriesLook,
    pub axis: YAxisSide,
    pub show_in_legend: bool,
}

impl SeriesSpec {
    pub fn new<S: Into<String>>(name: S, points: Vec<[f64; 2]>, look: SeriesLook) -> Self {
        Self {
            name: name.into(),
            points,
            look,
            axis: YAxisSide::Primary,
            show_in_legend: true,
        }
    }

    pub fn on_secondary(mut self) -> Self {
        self.axis = YAxisSide::Secondary;
        self
    }

    pub fn hidden_from_legend(mut self) -> Self {
        self.show_in_legend = false;
        self
    }
}

/// Free-standing text shown with the chart (e.g. the latest temperature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub color: Rgba,
    pub size: f32,
    pub strong: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub series: Vec<SeriesSpec>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub y2_axis: Option<AxisSpec>,
    pub annotations: Vec<Annotation>,
    /// Rendering identity. Bumped whenever the live data changes so the
    /// display refits instead of treating the frame as unchanged.
    pub revision: u64,
}

impl ChartSpec {
    pub fn new<S: Into<String>>(y_title: S) -> Self {
        Self {
            series: Vec::new(),
            x_axis: AxisSpec::new(""),
            y_axis: AxisSpec::new(y_title),
            y2_axis: None,
            annotations: Vec::new(),
            revision: 0,
        }
    }

    pub fn with_series(mut self, series: SeriesSpec) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_secondary_axis(mut self, axis: AxisSpec) -> Self {
        self.y2_axis = Some(axis);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn series(&self, name: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Replace a series' points in place. Returns `false` if no such series.
    pub fn set_series_points(&mut self, name: &str, points: Vec<[f64; 2]>) -> bool {
        match self.series.iter_mut().find(|s| s.name == name) {
            Some(s) => {
                s.points = points;
                true
            }
            None => false,
        }
    }

    /// Value range of all points on one side, if any.
    pub fn data_range(&self, side: YAxisSide) -> Option<(f64, f64)> {
        self.series
            .iter()
            .filter(|s| s.axis == side)
            .flat_map(|s| s.points.iter().map(|p| p[1]))
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }

    /// Effective primary-axis range: the fixed range, else the data range
    /// (widened when degenerate), else `(0, 1)`.
    pub fn primary_range(&self) -> (f64, f64) {
        effective_range(self.y_axis.range, self.data_range(YAxisSide::Primary))
    }

    /// Mapping for drawing secondary series, or `None` without a secondary axis.
    pub fn axis_mapping(&self) -> Option<AxisMapping> {
        let y2 = self.y2_axis.as_ref()?;
        Some(AxisMapping {
            primary: self.primary_range(),
            secondary: effective_range(y2.range, self.data_range(YAxisSide::Secondary)),
        })
    }

    /// Install a new live series and move the highlight overlay onto its
    /// newest point.
    pub fn apply_live_points(&mut self, revision: u64, points: Vec<[f64; 2]>) {
        let highlight: Vec<[f64; 2]> = points.last().copied().into_iter().collect();
        self.set_series_points(LIVE_SERIES, points);
        self.set_series_points(HIGHLIGHT_SERIES, highlight);
        self.revision = revision;
    }
}

fn effective_range(fixed: Option<(f64, f64)>, data: Option<(f64, f64)>) -> (f64, f64) {
    match (fixed, data) {
        (Some(r), _) => r,
        (None, Some((lo, hi))) if hi > lo => (lo, hi),
        (None, Some((v, _))) => (v - 0.5, v + 0.5),
        (None, None) => (0.0, 1.0),
    }
}

/// Linear map between a secondary axis range and the primary one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub primary: (f64, f64),
    pub secondary: (f64, f64),
}

impl AxisMapping {
    /// Secondary value to primary plot coordinate.
    pub fn to_primary(&self, v: f64) -> f64 {
        let (p0, p1) = self.primary;
        let (s0, s1) = self.secondary;
        p0 + (v - s0) / (s1 - s0) * (p1 - p0)
    }

    /// Primary plot coordinate to secondary value.
    pub fn to_secondary(&self, y: f64) -> f64 {
        let (p0, p1) = self.primary;
        let (s0, s1) = self.secondary;
        s0 + (y - p0) / (p1 - p0) * (s1 - s0)
    }
}

/// Either a chart or a notice explaining why there is nothing to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Chart(ChartSpec),
    NoData(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Point helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Plot points for a column, skipping missing values.
pub fn points_from_series(series: &[(NaiveDateTime, Option<f64>)]) -> Vec<[f64; 2]> {
    series
        .iter()
        .filter_map(|(ts, v)| v.map(|v| [to_plot_x(*ts), v]))
        .collect()
}

pub fn points_from_buckets(buckets: &[Bucket]) -> Vec<[f64; 2]> {
    buckets.iter().map(|b| [to_plot_x(b.start), b.mean]).collect()
}

fn column_points(table: &Table, column: &str) -> DashboardResult<Vec<[f64; 2]>> {
    Ok(points_from_series(&table.series(column)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

/// Forecast tab: a single orange line of the predicted generation.
pub fn forecast_chart(table: &Table, column: &str) -> DashboardResult<ChartSpec> {
    let points = column_points(table, column)?;
    Ok(ChartSpec::new(GENERATION_AXIS).with_series(SeriesSpec::new(
        "Predicted generation",
        points,
        SeriesLook::line(Rgba::ORANGE, 2.2),
    )))
}

/// Forecast tab with the date-range filter applied. An empty selection
/// yields [`ChartView::NoData`].
pub fn forecast_view(
    table: &Table,
    column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> DashboardResult<ChartView> {
    table.require_columns(&[column])?;
    let filtered = filter_date_range(table, start, end);
    if filtered.is_empty() {
        return Ok(ChartView::NoData(
            "No forecast data for the selected period.".to_string(),
        ));
    }
    forecast_chart(&filtered, column).map(ChartView::Chart)
}

/// Text annotation for the latest valid temperature, or a gray notice.
pub fn temperature_annotation(latest: Option<f64>) -> Annotation {
    match latest {
        Some(t) => Annotation {
            text: format!("Temperature: {t:.1} °C"),
            color: Rgba::CRIMSON,
            size: 14.0,
            strong: true,
        },
        None => Annotation {
            text: "Temperature: no data".to_string(),
            color: Rgba::GRAY,
            size: 14.0,
            strong: false,
        },
    }
}

/// Weather tab: GHI (left axis) and cloud opacity (right axis, fixed to
/// `[0, 100]`), annotated with the latest air temperature.
pub fn weather_chart(table: &Table) -> DashboardResult<ChartSpec> {
    table.require_columns(&["ghi", "cloud_opacity", "air_temp"])?;
    let ghi = column_points(table, "ghi")?;
    let cloud = column_points(table, "cloud_opacity")?;

    Ok(ChartSpec::new("GHI (W/m²)")
        .with_series(SeriesSpec::new("GHI (W/m²)", ghi, SeriesLook::line(Rgba::ORANGE, 2.0)))
        .with_series(
            SeriesSpec::new(
                "Cloud Opacity (%)",
                cloud,
                SeriesLook::line(Rgba::BLUE, 2.0).with_dash(LineDash::dotted()),
            )
            .on_secondary(),
        )
        .with_secondary_axis(AxisSpec::new("Cloud opacity (%)").fixed(0.0, 100.0).without_grid())
        .with_annotation(temperature_annotation(table.last_valid("air_temp"))))
}

/// Ambient sensor chart: temperature (left) and relative humidity (right,
/// `[0, 100]`).
pub fn ambient_chart(table: &Table) -> DashboardResult<ChartSpec> {
    table.require_columns(&["temperature", "humidity"])?;
    let temperature = column_points(table, "temperature")?;
    let humidity = column_points(table, "humidity")?;
    Ok(ChartSpec::new("Temperature (°C)")
        .with_series(SeriesSpec::new(
            "Temperature (°C)",
            temperature,
            SeriesLook::line(Rgba::CRIMSON, 2.0),
        ))
        .with_series(
            SeriesSpec::new(
                "Humidity (%)",
                humidity,
                SeriesLook::line(Rgba::SEA_GREEN, 2.0).with_dash(LineDash::dashed()),
            )
            .on_secondary(),
        )
        .with_secondary_axis(AxisSpec::new("Humidity (%)").fixed(0.0, 100.0).without_grid()))
}

/// Live tab: the dotted forecast baseline, the live series and the
/// newest-point overlay. Live data starts empty and arrives through
/// [`ChartSpec::apply_live_points`].
pub fn live_chart(forecast: Vec<[f64; 2]>) -> ChartSpec {
    ChartSpec::new(GENERATION_AXIS)
        .with_series(SeriesSpec::new(
            FORECAST_SERIES,
            forecast,
            SeriesLook::line(Rgba::ORANGE, 2.0).with_dash(LineDash::dotted()),
        ))
        .with_series(SeriesSpec::new(
            LIVE_SERIES,
            Vec::new(),
            SeriesLook::line(Rgba::ROYAL_BLUE, 3.0),
        ))
        .with_series(
            SeriesSpec::new(HIGHLIGHT_SERIES, Vec::new(), SeriesLook::markers(Rgba::ROYAL_BLUE, 6.0))
                .hidden_from_legend(),
        )
}
