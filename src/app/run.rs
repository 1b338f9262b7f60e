//! Top-level entry point for running the dashboard as a native window.

use std::sync::mpsc::Receiver;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::controllers::{channel_refresh, RefreshCommand};
use crate::data::csv_table::FeedSchema;
use crate::error::{DashboardError, DashboardResult};
use crate::refresh::{spawn_refresh_worker, LiveSettings};
use crate::sink::{channel_dashboard, DashboardSink};

use super::dashboard_app::DashboardApp;

/// Open the dashboard window and block until it is closed.
///
/// Static feeds start loading and the live refresh worker starts as soon as
/// the egui context exists, so their updates trigger repaints.
pub fn run_dashboard(cfg: DashboardConfig) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(1280.0, 800.0)),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        opts,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            let (sink, rx) = channel_dashboard();
            let sink = sink.with_repaint(cc.egui_ctx.clone());
            let (controller, commands) = channel_refresh();

            let mut app = DashboardApp::new(cfg.clone(), rx, sink.clone(), Some(controller));
            if let Err(e) = start_live_worker(&cfg, commands, sink) {
                tracing::error!(error = %e, "live refresh not started");
                app.push_setup_error(format!("Live updates unavailable: {e}"));
            }
            app.load_all();
            Ok(Box::new(app))
        }),
    )
}

fn start_live_worker(
    cfg: &DashboardConfig,
    commands: Receiver<RefreshCommand>,
    sink: DashboardSink,
) -> DashboardResult<()> {
    let live = &cfg.live;
    let generation_schema = live.generation.schema_or(FeedSchema::live_power());
    let baseline_schema = live.forecast.schema_or(FeedSchema::forecast());
    let settings = LiveSettings {
        interval: live.refresh_interval(),
        mode: live.mode,
        bucket: live.bucket_width(),
        clip_to_now: live.clip_to_now,
        reveal_batch: live.reveal_batch,
        column: generation_schema.value_columns.first().cloned().unwrap_or_default(),
        baseline_column: baseline_schema.value_columns.first().cloned().unwrap_or_default(),
    };
    let generation = cfg.source_for(&live.generation, generation_schema)?;
    let baseline = cfg.source_for(&live.forecast, baseline_schema)?;
    spawn_refresh_worker(generation, baseline, settings, commands, sink)
        .map_err(|e| DashboardError::Config(format!("cannot start live worker: {e}")))?;
    tracing::info!(mode = ?live.mode, interval = ?live.refresh_interval(), "live refresh started");
    Ok(())
}
