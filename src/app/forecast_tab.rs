//! Forecast tab: predicted generation over a user-selected date range.

use chrono::NaiveDate;
use eframe::egui::{self, Ui};

use crate::chart::{forecast_view, ChartView};
use crate::data::table::Table;
use crate::error::DashboardResult;
use crate::plot::{warning_label, ChartPlot};

pub struct ForecastTab {
    column: String,
    table: Option<Table>,
    dates: Vec<NaiveDate>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    view: Option<ChartView>,
    error: Option<String>,
    loading: bool,
    revision: u64,
    plot: ChartPlot,
}

impl ForecastTab {
    pub fn new<S: Into<String>>(column: S) -> Self {
        Self {
            column: column.into(),
            table: None,
            dates: Vec::new(),
            start: None,
            end: None,
            view: None,
            error: None,
            loading: true,
            revision: 0,
            plot: ChartPlot::new("forecast_plot"),
        }
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    /// Install a freshly loaded table; the range resets to all available dates.
    pub fn set_loaded(&mut self, result: DashboardResult<Table>) {
        self.loading = false;
        match result {
            Ok(table) => {
                let available = table.available_dates();
                self.start = available.first().copied();
                self.end = available.last().copied();
                self.dates = calendar_days(self.start, self.end);
                self.table = Some(table);
                self.error = None;
                self.rebuild();
            }
            Err(e) => {
                self.error = Some(format!("Could not load forecast data: {e}"));
                self.table = None;
                self.dates.clear();
                self.view = None;
            }
        }
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = Some(start);
        self.end = Some(end);
        self.rebuild();
    }

    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }

    pub fn view(&self) -> Option<&ChartView> {
        self.view.as_ref()
    }

    /// Dates offered by the From/To pickers, gaps in the feed included.
    pub fn date_choices(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn rebuild(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let Some((start, end)) = self.range() else {
            self.view = Some(ChartView::NoData("The forecast feed has no rows.".to_string()));
            return;
        };
        match forecast_view(table, &self.column, start, end) {
            Ok(mut view) => {
                self.revision += 1;
                if let ChartView::Chart(spec) = &mut view {
                    spec.revision = self.revision;
                }
                self.view = Some(view);
                self.error = None;
            }
            Err(e) => {
                self.view = None;
                self.error = Some(format!("Forecast data unusable: {e}"));
            }
        }
    }

    /// Draw the tab. Returns `true` when the user asked for a reload.
    pub fn ui(&mut self, ui: &mut Ui) -> bool {
        let mut reload = false;
        ui.horizontal(|ui| {
            if ui.button("Reload").clicked() {
                reload = true;
            }
            if self.loading {
                ui.spinner();
            }
            if let Some((mut start, mut end)) = self.range() {
                ui.separator();
                date_combo(ui, "forecast_start", "From", &mut start, &self.dates);
                date_combo(ui, "forecast_end", "To", &mut end, &self.dates);
                if Some((start, end)) != self.range() {
                    self.set_range(start, end);
                }
            }
        });

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
        reload
    }
}

/// Every calendar day from `first` through `last`.
fn calendar_days(first: Option<NaiveDate>, last: Option<NaiveDate>) -> Vec<NaiveDate> {
    match first.zip(last) {
        Some((first, last)) => first.iter_days().take_while(|d| *d <= last).collect(),
        None => Vec::new(),
    }
}

fn date_combo(ui: &mut Ui, id: &str, label: &str, value: &mut NaiveDate, dates: &[NaiveDate]) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.format("%Y-%m-%d").to_string())
        .show_ui(ui, |ui| {
            for d in dates {
                ui.selectable_value(value, *d, d.format("%Y-%m-%d").to_string());
            }
        });
}
