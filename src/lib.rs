//! pvdash crate root: re-exports and module wiring.
//!
//! A desktop dashboard for a solar PV installation built on egui/eframe:
//! forecast generation over a chosen date range, current weather, and a live
//! generation chart that refreshes on a fixed interval.
//!
//! - `data`: CSV feeds, the in-memory table, range filtering and resampling
//! - `chart`: what to draw, as plain comparable values
//! - `plot`: drawing charts with egui_plot
//! - `refresh`: the live refresh state machine and its worker thread
//! - `loader`: one-shot background loads of the static feeds
//! - `sink` / `controllers`: channels between workers and the UI
//! - `config`: YAML configuration with defaults
//! - `app`: the eframe application and its tabs

pub mod app;
pub mod chart;
pub mod config;
pub mod controllers;
pub mod data;
pub mod error;
pub mod loader;
pub mod plot;
pub mod refresh;
pub mod sink;

// Public re-exports for a compact external API
pub use app::{run_dashboard, DashboardApp};
pub use chart::{ChartSpec, ChartView};
pub use config::{DashboardConfig, LiveMode};
pub use controllers::{channel_refresh, RefreshCommand, RefreshController};
pub use error::{DashboardError, DashboardResult};
pub use refresh::{RefreshLoop, RunState, TickOutput};
pub use sink::{channel_dashboard, DashboardSink, DashboardUpdate, LiveEvent};
