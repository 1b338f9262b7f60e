//! Dashboard GUI.
//!
//! | Sub-module         | Responsibility |
//! | ------------------ | -------------- |
//! | [`dashboard_app`]  | [`DashboardApp`] (eframe), update routing and tab switching |
//! | `live_tab`         | Live generation chart and the pause/resume control |
//! | `forecast_tab`     | Forecast chart with the date-range selection |
//! | `weather_tab`      | Weather and ambient charts |
//! | `run`              | [`run_dashboard()`] entry point |

pub mod dashboard_app;
pub mod forecast_tab;
pub mod live_tab;
mod run;
pub mod weather_tab;

pub use dashboard_app::{DashboardApp, Tab};
pub use run::run_dashboard;
