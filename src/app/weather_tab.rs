//! Weather tab: irradiance and cloud opacity, plus the optional ambient
//! sensor chart.

use eframe::egui::{self, Ui};

use crate::chart::{ambient_chart, weather_chart, ChartSpec, ChartView};
use crate::data::table::Table;
use crate::error::{DashboardError, DashboardResult};
use crate::plot::{warning_label, ChartPlot};

/// One chart slot of the tab.
struct Panel {
    title: &'static str,
    build: fn(&Table) -> DashboardResult<ChartSpec>,
    view: Option<ChartView>,
    error: Option<String>,
    loading: bool,
    loads: u64,
    plot: ChartPlot,
}

impl Panel {
    fn new(title: &'static str, id: &str, build: fn(&Table) -> DashboardResult<ChartSpec>) -> Self {
        Self {
            title,
            build,
            view: None,
            error: None,
            loading: true,
            loads: 0,
            plot: ChartPlot::new(id),
        }
    }

    fn set_loaded(&mut self, result: DashboardResult<Table>) {
        self.loading = false;
        let built = result.and_then(|table| {
            if table.is_empty() {
                return Ok(ChartView::NoData(format!("No {} data available.", self.title)));
            }
            (self.build)(&table).map(ChartView::Chart)
        });
        match built {
            Ok(mut view) => {
                self.loads += 1;
                if let ChartView::Chart(spec) = &mut view {
                    spec.revision = self.loads;
                }
                self.view = Some(view);
                self.error = None;
            }
            Err(e @ DashboardError::MissingColumns(_)) => {
                self.view = None;
                self.error = Some(format!("The {} feed cannot be charted: {e}", self.title));
            }
            Err(e) => {
                self.view = None;
                self.error = Some(format!("Could not load {} data: {e}", self.title));
            }
        }
    }

    fn ui(&mut self, ui: &mut Ui) {
        if let Some(e) = &self.error {
            warning_label(ui, e);
        }
        match &self.view {
            Some(ChartView::Chart(spec)) => self.plot.show(ui, spec),
            Some(ChartView::NoData(msg)) => {
                ui.colored_label(egui::Color32::YELLOW, msg);
            }
            None => {}
        }
    }
}

pub struct WeatherTab {
    weather: Panel,
    ambient: Option<Panel>,
}

impl WeatherTab {
    pub fn new(with_ambient: bool) -> Self {
        Self {
            weather: Panel::new("weather", "weather_plot", weather_chart),
            ambient: with_ambient.then(|| Panel::new("ambient", "ambient_plot", ambient_chart)),
        }
    }

    pub fn set_loading(&mut self) {
        self.weather.loading = true;
        if let Some(a) = &mut self.ambient {
            a.loading = true;
        }
    }

    pub fn set_weather(&mut self, result: DashboardResult<Table>) {
        self.weather.set_loaded(result);
    }

    pub fn set_ambient(&mut self, result: DashboardResult<Table>) {
        match &mut self.ambient {
            Some(a) => a.set_loaded(result),
            None => tracing::debug!("ambient data received without an ambient panel"),
        }
    }

    pub fn weather_view(&self) -> Option<&ChartView> {
        self.weather.view.as_ref()
    }

    pub fn weather_error(&self) -> Option<&str> {
        self.weather.error.as_deref()
    }

    pub fn ambient_view(&self) -> Option<&ChartView> {
        self.ambient.as_ref().and_then(|a| a.view.as_ref())
    }

    /// Draw the tab. Returns `true` when the user asked for a reload.
    pub fn ui(&mut self, ui: &mut Ui) -> bool {
        let mut reload = false;
        let loading = self.weather.loading || self.ambient.as_ref().is_some_and(|a| a.loading);
        ui.horizontal(|ui| {
            if ui.button("Reload").clicked() {
                reload = true;
            }
            if loading {
                ui.spinner();
            }
        });

        match &mut self.ambient {
            None => self.weather.ui(ui),
            Some(ambient) => {
                let half = (ui.available_height() / 2.0).max(120.0);
                ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui| {
                    self.weather.ui(ui);
                });
                ui.separator();
                ui.heading("Ambient conditions");
                ambient.ui(ui);
            }
        }
        reload
    }
}
