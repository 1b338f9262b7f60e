//! Live generation tab: forecast baseline plus the refreshing live series.

use eframe::egui::{self, Ui};
use egui_phosphor::regular::{PAUSE, PLAY};

use crate::chart::{live_chart, ChartSpec, FORECAST_SERIES, LIVE_SERIES};
use crate::controllers::RefreshController;
use crate::data::x_formatter::from_plot_x;
use crate::plot::{warning_label, ChartPlot};
use crate::refresh::RunState;
use crate::sink::LiveEvent;

pub struct LiveTab {
    chart: ChartSpec,
    plot: ChartPlot,
    controller: Option<RefreshController>,
    state: RunState,
    baseline_error: Option<String>,
    warning: Option<String>,
    finished: bool,
    total: Option<usize>,
}

impl LiveTab {
    pub fn new(controller: Option<RefreshController>) -> Self {
        Self {
            chart: live_chart(Vec::new()),
            plot: ChartPlot::new("live_plot"),
            controller,
            state: RunState::Running,
            baseline_error: None,
            warning: None,
            finished: false,
            total: None,
        }
    }

    pub fn chart(&self) -> &ChartSpec {
        &self.chart
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn baseline_error(&self) -> Option<&str> {
        self.baseline_error.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one event from the refresh worker.
    pub fn handle(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Baseline(Ok(points)) => {
                self.chart.set_series_points(FORECAST_SERIES, points);
                self.baseline_error = None;
            }
            LiveEvent::Baseline(Err(e)) => {
                self.baseline_error = Some(format!("Forecast baseline unavailable: {e}"));
            }
            LiveEvent::Frame(frame) => {
                self.chart.apply_live_points(frame.revision, frame.points);
                self.total = frame.total;
                self.warning = None;
            }
            LiveEvent::Paused => self.state = RunState::Paused,
            LiveEvent::State(state) => self.state = state,
            LiveEvent::Warning(msg) => self.warning = Some(msg),
            LiveEvent::Finished => self.finished = true,
        }
    }

    /// Ask the worker to flip the run state. The displayed state changes once
    /// the worker confirms.
    /// Pause when the tab shows Running, resume when it shows Paused.
    pub fn toggle(&mut self) {
        let sent = self.controller.as_ref().is_some_and(|c| match self.state {
            RunState::Running => c.pause(),
            RunState::Paused => c.resume(),
        });
        if !sent {
            tracing::debug!("live refresh loop is not running; toggle ignored");
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let icon = match self.state {
                RunState::Running => PAUSE,
                RunState::Paused => PLAY,
            };
            let label = format!("{icon} {}", self.state.button_label());
            let enabled = self.controller.is_some() && !self.finished;
            if ui
                .add_enabled(enabled, egui::Button::new(label))
                .clicked()
            {
                self.toggle();
            }

            if let Some(last) = self.chart.series(LIVE_SERIES).and_then(|s| s.points.last()) {
                ui.separator();
                ui.label(format!(
                    "Latest: {:.0} W at {}",
                    last[1],
                    from_plot_x(last[0]).format("%H:%M:%S")
                ));
            }
            if let Some(total) = self.total {
                let shown = self.chart.series(LIVE_SERIES).map_or(0, |s| s.points.len());
                ui.separator();
                ui.label(format!("{shown} / {total} readings"));
            }
        });

        if self.state.is_paused() {
            ui.colored_label(egui::Color32::YELLOW, "Updates paused.");
        }
        if self.finished {
            ui.label("Replay finished: all readings shown.");
        }
        if let Some(e) = &self.baseline_error {
            warning_label(ui, e);
        }
        if let Some(w) = &self.warning {
            warning_label(ui, w);
        }
        if self.chart.series(LIVE_SERIES).is_some_and(|s| s.points.is_empty()) && !self.finished {
            ui.label("Waiting for live data…");
        }

        self.plot.show(ui, &self.chart);
    }
}
