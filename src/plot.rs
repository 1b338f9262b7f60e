//! Drawing a [`ChartSpec`] with egui_plot.
//!
//! egui_plot has a single y coordinate system. Series on the secondary axis are
//! mapped onto the primary range with [`AxisMapping`] before drawing, and the
//! right-hand axis labels apply the inverse mapping so they read in secondary
//! units.

use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, Ui};
use egui_plot::{
    AxisHints, Corner, GridMark, HPlacement, Legend, Line, MarkerShape, Plot, PlotPoint, Points,
};

use crate::chart::{ChartSpec, SeriesSpec, YAxisSide};
use crate::data::trace_look::SeriesLook;
use crate::data::x_formatter::{from_plot_x, TimeAxisFormatter, ValueFormatter};

/// Plot widget state for one chart slot.
///
/// Remembers the revision last drawn; a new revision resets the view so the
/// axes refit to the new data.
pub struct ChartPlot {
    id_salt: String,
    shown_revision: Option<u64>,
    x_fmt: TimeAxisFormatter,
}

impl ChartPlot {
    pub fn new<S: Into<String>>(id_salt: S) -> Self {
        Self {
            id_salt: id_salt.into(),
            shown_revision: None,
            x_fmt: TimeAxisFormatter::default(),
        }
    }

    pub fn show(&mut self, ui: &mut Ui, spec: &ChartSpec) {
        if !spec.annotations.is_empty() {
            ui.horizontal(|ui| {
                for a in &spec.annotations {
                    let mut text = RichText::new(&a.text)
                        .color(a.color.to_color32())
                        .size(a.size);
                    if a.strong {
                        text = text.strong();
                    }
                    ui.label(text);
                }
            });
        }

        let mapping = spec.axis_mapping();
        let x_fmt = self.x_fmt.clone();
        let y_fmt = ValueFormatter::default();

        let mut y_axes = vec![AxisHints::new_y()
            .label(spec.y_axis.title.clone())
            .placement(HPlacement::Left)
            .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                y_fmt.format(mark.value, mark.step_size.abs())
            })];
        if let (Some(y2), Some(m)) = (&spec.y2_axis, mapping) {
            let y2_fmt = ValueFormatter::default();
            let scale = ((m.secondary.1 - m.secondary.0) / (m.primary.1 - m.primary.0)).abs();
            y_axes.push(
                AxisHints::new_y()
                    .label(y2.title.clone())
                    .placement(HPlacement::Right)
                    .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                        y2_fmt.format(m.to_secondary(mark.value), mark.step_size.abs() * scale)
                    }),
            );
        }

        let mut plot = Plot::new(&self.id_salt)
            .legend(Legend::default().position(Corner::LeftTop))
            .show_grid([spec.x_axis.show_grid, spec.y_axis.show_grid])
            .custom_y_axes(y_axes)
            .x_axis_formatter(move |x: GridMark, range: &RangeInclusive<f64>| {
                x_fmt.format(x.value, (*range.start(), *range.end()))
            })
            .label_formatter(move |name: &str, value: &PlotPoint| {
                let t = from_plot_x(value.x).format("%Y-%m-%d %H:%M:%S");
                if name.is_empty() {
                    format!("{t}\n{:.2}", value.y)
                } else {
                    format!("{name}\n{t}\n{:.2}", value.y)
                }
            });

        if let Some((lo, hi)) = spec.y_axis.range {
            plot = plot.include_y(lo).include_y(hi);
        }
        if self.shown_revision != Some(spec.revision) {
            plot = plot.reset();
            self.shown_revision = Some(spec.revision);
        }

        plot.show(ui, |plot_ui| {
            for series in &spec.series {
                let points: Vec<[f64; 2]> = match (series.axis, mapping) {
                    (YAxisSide::Secondary, Some(m)) => series
                        .points
                        .iter()
                        .map(|p| [p[0], m.to_primary(p[1])])
                        .collect(),
                    _ => series.points.clone(),
                };
                draw_series(plot_ui, series, points);
            }
        });
    }
}

fn draw_series(plot_ui: &mut egui_plot::PlotUi, series: &SeriesSpec, points: Vec<[f64; 2]>) {
    let (with_line, with_points) = series_items(&series.look, points.is_empty());
    // Unnamed items stay out of the legend.
    let name = if series.show_in_legend {
        series.name.clone()
    } else {
        String::new()
    };
    let look = &series.look;
    let color = look.color.to_color32();
    if with_line {
        plot_ui.line(
            Line::new(name.clone(), points.clone())
                .color(color)
                .width(look.width.max(0.1))
                .style(look.dash.to_line_style()),
        );
    }
    if with_points {
        plot_ui.points(
            Points::new(name, points)
                .radius(look.point_size.max(0.5))
                .shape(MarkerShape::Circle)
                .color(color)
                .filled(true),
        );
    }
}

/// Which plot items a series emits as `(line, points)`.
///
/// An empty series still emits a line so its legend entry is present before data arrives.
fn series_items(look: &SeriesLook, empty: bool) -> (bool, bool) {
    (look.show_line || empty, look.show_points && !empty)
}

/// Light-red warning banner.
pub fn warning_label(ui: &mut Ui, text: &str) {
    ui.colored_label(egui::Color32::LIGHT_RED, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::trace_look::Rgba;

    #[test]
    fn empty_series_still_emits_a_line() {
        let line = SeriesLook::line(Rgba::ORANGE, 2.0);
        assert_eq!(series_items(&line, true), (true, false));
        let markers = SeriesLook::markers(Rgba::ROYAL_BLUE, 6.0);
        assert_eq!(series_items(&markers, true), (true, false));
    }

    #[test]
    fn non_empty_series_follow_their_look() {
        let line = SeriesLook::line(Rgba::ORANGE, 2.0);
        assert_eq!(series_items(&line, false), (true, false));
        let markers = SeriesLook::markers(Rgba::ROYAL_BLUE, 6.0);
        assert_eq!(series_items(&markers, false), (false, true));
    }
}
