use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::controllers::RefreshController;
use crate::data::csv_table::FeedSchema;
use crate::data::table::Table;
use crate::error::{DashboardError, DashboardResult};
use crate::loader::spawn_load;
use crate::sink::{DashboardSink, DashboardUpdate, Feed};

use super::forecast_tab::ForecastTab;
use super::live_tab::LiveTab;
use super::weather_tab::WeatherTab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Live,
    Forecast,
    Weather,
}

pub struct DashboardApp {
    cfg: DashboardConfig,
    rx: Receiver<DashboardUpdate>,
    sink: DashboardSink,
    tab: Tab,
    pub live: LiveTab,
    pub forecast: ForecastTab,
    pub weather: WeatherTab,
    /// Errors that prevented a feed from being loaded at all.
    setup_errors: Vec<String>,
}

impl DashboardApp {
    pub fn new(
        cfg: DashboardConfig,
        rx: Receiver<DashboardUpdate>,
        sink: DashboardSink,
        controller: Option<RefreshController>,
    ) -> Self {
        let forecast_column = cfg
            .forecast
            .schema_or(FeedSchema::forecast())
            .value_columns
            .first()
            .cloned()
            .unwrap_or_default();
        let with_ambient = cfg.ambient.is_some();
        Self {
            cfg,
            rx,
            sink,
            tab: Tab::Live,
            live: LiveTab::new(controller),
            forecast: ForecastTab::new(forecast_column),
            weather: WeatherTab::new(with_ambient),
            setup_errors: Vec::new(),
        }
    }

    /// Start (or restart) the one-shot load of a static feed.
    pub fn load(&mut self, feed: Feed) {
        let (feed_cfg, fallback) = match feed {
            Feed::Forecast => (Some(&self.cfg.forecast), FeedSchema::forecast()),
            Feed::Weather => (Some(&self.cfg.weather), FeedSchema::weather()),
            Feed::Ambient => (self.cfg.ambient.as_ref(), FeedSchema::ambient()),
        };
        let Some(feed_cfg) = feed_cfg else {
            return;
        };
        let started = self
            .cfg
            .source_for(feed_cfg, fallback)
            .and_then(|source| {
                spawn_load(feed, source, self.sink.clone()).map_err(|e| {
                    DashboardError::Config(format!("cannot start {} loader: {e}", feed.label()))
                })
            });
        match started {
            Ok(_) => match feed {
                Feed::Forecast => self.forecast.set_loading(),
                Feed::Weather | Feed::Ambient => self.weather.set_loading(),
            },
            Err(e) => {
                tracing::error!(feed = feed.label(), error = %e, "feed not loaded");
                self.route_loaded(feed, Err(e));
            }
        }
    }

    pub fn load_all(&mut self) {
        self.load(Feed::Forecast);
        self.load(Feed::Weather);
        self.load(Feed::Ambient);
    }

    pub fn push_setup_error(&mut self, msg: String) {
        self.setup_errors.push(msg);
    }

    fn route_loaded(&mut self, feed: Feed, result: DashboardResult<Table>) {
        match feed {
            Feed::Forecast => self.forecast.set_loaded(result),
            Feed::Weather => self.weather.set_weather(result),
            Feed::Ambient => self.weather.set_ambient(result),
        }
    }

    /// Drain every pending update without blocking.
    pub fn drain_updates(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(DashboardUpdate::Loaded(feed, result)) => self.route_loaded(feed, result),
                Ok(DashboardUpdate::Live(event)) => self.live.handle(event),
                // The app keeps a sink of its own, so the channel never disconnects.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// eframe integration
// ─────────────────────────────────────────────────────────────────────────────

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_updates();

        egui::TopBottomPanel::top("dashboard_headline").show(ctx, |ui| {
            ui.heading(self.cfg.title.as_str());
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Live, "Live generation");
                ui.selectable_value(&mut self.tab, Tab::Forecast, "Forecast");
                ui.selectable_value(&mut self.tab, Tab::Weather, "Weather");
            });
            for e in &self.setup_errors {
                ui.colored_label(egui::Color32::LIGHT_RED, e);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Live => self.live.ui(ui),
            Tab::Forecast => {
                if self.forecast.ui(ui) {
                    self.load(Feed::Forecast);
                }
            }
            Tab::Weather => {
                if self.weather.ui(ui) {
                    self.load(Feed::Weather);
                    self.load(Feed::Ambient);
                }
            }
        });

        // Workers request repaints on new data; this only keeps spinners moving.
        ctx.request_repaint_after(Duration::from_secs(1));
    }
}
