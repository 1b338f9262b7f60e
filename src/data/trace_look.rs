//! SeriesLook: visual styling for chart series.
//!
//! Styles are plain serde types so that chart specifications stay comparable
//! and serializable; conversion into egui/egui_plot types happens at draw time.

use eframe::egui;
use egui_plot::LineStyle;
use serde::{Deserialize, Serialize};

/// An sRGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const ORANGE: Rgba = Rgba([255, 165, 0, 255]);
    pub const BLUE: Rgba = Rgba([0, 0, 255, 255]);
    pub const ROYAL_BLUE: Rgba = Rgba([65, 105, 225, 255]);
    pub const CRIMSON: Rgba = Rgba([220, 20, 60, 255]);
    pub const GRAY: Rgba = Rgba([128, 128, 128, 255]);
    pub const SEA_GREEN: Rgba = Rgba([46, 139, 87, 255]);

    pub fn to_color32(self) -> egui::Color32 {
        let [r, g, b, a] = self.0;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineDash {
    Solid,
    Dashed { length: f32 },
    Dotted { spacing: f32 },
}

impl LineDash {
    pub fn dashed() -> Self {
        LineDash::Dashed { length: 6.0 }
    }

    pub fn dotted() -> Self {
        LineDash::Dotted { spacing: 4.0 }
    }

    pub fn to_line_style(self) -> LineStyle {
        match self {
            LineDash::Solid => LineStyle::Solid,
            LineDash::Dashed { length } => LineStyle::Dashed { length },
            LineDash::Dotted { spacing } => LineStyle::Dotted { spacing },
        }
    }
}

/// The visual presentation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesLook {
    pub color: Rgba,
    pub width: f32,
    pub dash: LineDash,
    /// Draw the connecting line. A highlight overlay sets this to `false`.
    pub show_line: bool,
    /// Draw a marker at every point of the series.
    pub show_points: bool,
    pub point_size: f32,
}

impl Default for SeriesLook {
    fn default() -> Self {
        Self {
            color: Rgba::GRAY,
            width: 2.0,
            dash: LineDash::Solid,
            show_line: true,
            show_points: false,
            point_size: 4.0,
        }
    }
}

impl SeriesLook {
    /// Solid line of the given color and width.
    pub fn line(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            ..Default::default()
        }
    }

    pub fn with_dash(mut self, dash: LineDash) -> Self {
        self.dash = dash;
        self
    }

    /// Markers only, no connecting line.
    pub fn markers(color: Rgba, point_size: f32) -> Self {
        Self {
            color,
            show_line: false,
            show_points: true,
            point_size,
            ..Default::default()
        }
    }
}
