use chrono::NaiveDate;
use pvdash::chart::*;
use pvdash::data::csv_table::{parse_csv, FeedSchema};
use pvdash::data::trace_look::{LineDash, Rgba};
use pvdash::DashboardError;

const FORECAST: &str = "\
datetime,predicted_pv
2024-06-01 06:00:00,0
2024-06-01 12:00:00,4200
2024-06-02 12:00:00,3900
2024-06-03 12:00:00,
";

const WEATHER: &str = "\
datetime,ghi,cloud_opacity,air_temp
2024-06-01 10:00:00,500,20,18.5
2024-06-01 10:30:00,620,40,19.74
2024-06-01 11:00:00,700,10,
";

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

#[test]
fn forecast_chart_is_idempotent() {
    let table = parse_csv(FORECAST.as_bytes(), &FeedSchema::forecast()).unwrap();
    let a = forecast_chart(&table, "predicted_pv").unwrap();
    let b = forecast_chart(&table, "predicted_pv").unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    // Missing values are skipped, not plotted as zero.
    assert_eq!(a.series[0].points.len(), 3);
}

#[test]
fn forecast_view_filters_selected_dates() {
    let table = parse_csv(FORECAST.as_bytes(), &FeedSchema::forecast()).unwrap();
    match forecast_view(&table, "predicted_pv", date(2), date(2)).unwrap() {
        ChartView::Chart(spec) => {
            assert_eq!(spec.series.len(), 1);
            assert_eq!(spec.series[0].points.len(), 1);
            assert_eq!(spec.series[0].points[0][1], 3900.0);
        }
        ChartView::NoData(msg) => panic!("unexpected notice: {msg}"),
    }
}

#[test]
fn forecast_view_empty_range_is_a_notice() {
    let table = parse_csv(FORECAST.as_bytes(), &FeedSchema::forecast()).unwrap();
    let view = forecast_view(&table, "predicted_pv", date(20), date(21)).unwrap();
    assert!(matches!(view, ChartView::NoData(ref m) if m.contains("No forecast data")));
}

#[test]
fn forecast_view_requires_value_column() {
    let table = parse_csv(FORECAST.as_bytes(), &FeedSchema::forecast()).unwrap();
    let err = forecast_view(&table, "power", date(1), date(2)).unwrap_err();
    assert!(matches!(err, DashboardError::MissingColumns(_)));
}

#[test]
fn weather_chart_uses_dual_axes() {
    let table = parse_csv(WEATHER.as_bytes(), &FeedSchema::weather()).unwrap();
    let spec = weather_chart(&table).unwrap();

    let ghi = spec.series("GHI (W/m²)").unwrap();
    assert_eq!(ghi.axis, YAxisSide::Primary);
    assert_eq!(ghi.look.dash, LineDash::Solid);

    let cloud = spec.series("Cloud Opacity (%)").unwrap();
    assert_eq!(cloud.axis, YAxisSide::Secondary);
    assert!(matches!(cloud.look.dash, LineDash::Dotted { .. }));

    let y2 = spec.y2_axis.as_ref().unwrap();
    assert_eq!(y2.range, Some((0.0, 100.0)));
    assert!(!y2.show_grid);
}

#[test]
fn weather_chart_annotates_latest_valid_temperature() {
    let table = parse_csv(WEATHER.as_bytes(), &FeedSchema::weather()).unwrap();
    let spec = weather_chart(&table).unwrap();
    assert_eq!(spec.annotations.len(), 1);
    assert_eq!(spec.annotations[0].text, "Temperature: 19.7 °C");
    assert_eq!(spec.annotations[0].color, Rgba::CRIMSON);
}

#[test]
fn temperature_annotation_without_data() {
    let a = temperature_annotation(None);
    assert_eq!(a.text, "Temperature: no data");
    assert!(!a.strong);
}

#[test]
fn weather_chart_on_empty_table_has_empty_traces() {
    let table = parse_csv("datetime,ghi,cloud_opacity,air_temp\n".as_bytes(), &FeedSchema::weather()).unwrap();
    let spec = weather_chart(&table).unwrap();
    assert!(spec.series.iter().all(|s| s.points.is_empty()));
    assert_eq!(spec.primary_range(), (0.0, 1.0));
    assert_eq!(spec.annotations[0].text, "Temperature: no data");
}

#[test]
fn weather_chart_reports_missing_columns() {
    let csv = "datetime,ghi\n2024-06-01 10:00:00,1\n";
    let schema = FeedSchema::new("datetime", &["ghi"]);
    let table = parse_csv(csv.as_bytes(), &schema).unwrap();
    let err = weather_chart(&table).unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing required column(s): cloud_opacity, air_temp"
    );
}

#[test]
fn ambient_chart_puts_humidity_on_secondary_axis() {
    let csv = "datetime,temperature,humidity\n2024-06-01 10:00:00,21.5,55\n";
    let table = parse_csv(csv.as_bytes(), &FeedSchema::ambient()).unwrap();
    let spec = ambient_chart(&table).unwrap();
    assert_eq!(spec.series("Humidity (%)").unwrap().axis, YAxisSide::Secondary);
    assert!(matches!(
        spec.series("Humidity (%)").unwrap().look.dash,
        LineDash::Dashed { .. }
    ));
}

#[test]
fn axis_mapping_round_trips() {
    let table = parse_csv(WEATHER.as_bytes(), &FeedSchema::weather()).unwrap();
    let spec = weather_chart(&table).unwrap();
    let m = spec.axis_mapping().unwrap();
    assert_eq!(m.primary, (500.0, 700.0));
    assert_eq!(m.secondary, (0.0, 100.0));
    assert!((m.to_primary(0.0) - 500.0).abs() < 1e-9);
    assert!((m.to_primary(100.0) - 700.0).abs() < 1e-9);
    assert!((m.to_secondary(m.to_primary(37.0)) - 37.0).abs() < 1e-9);
}

#[test]
fn single_axis_chart_has_no_mapping() {
    let table = parse_csv(FORECAST.as_bytes(), &FeedSchema::forecast()).unwrap();
    assert!(forecast_chart(&table, "predicted_pv").unwrap().axis_mapping().is_none());
}

#[test]
fn live_chart_highlights_only_newest_point() {
    let mut spec = live_chart(vec![[0.0, 100.0], [60.0, 200.0]]);
    assert!(spec.series(LIVE_SERIES).unwrap().points.is_empty());
    assert!(spec.series(HIGHLIGHT_SERIES).unwrap().points.is_empty());
    assert!(!spec.series(HIGHLIGHT_SERIES).unwrap().show_in_legend);

    spec.apply_live_points(3, vec![[0.0, 1.0], [15.0, 2.0], [30.0, 3.0]]);
    assert_eq!(spec.revision, 3);
    assert_eq!(spec.series(LIVE_SERIES).unwrap().points.len(), 3);
    assert_eq!(spec.series(HIGHLIGHT_SERIES).unwrap().points, vec![[30.0, 3.0]]);
    assert_eq!(spec.series(FORECAST_SERIES).unwrap().points.len(), 2);

    spec.apply_live_points(4, Vec::new());
    assert!(spec.series(HIGHLIGHT_SERIES).unwrap().points.is_empty());
}

#[test]
fn revision_distinguishes_otherwise_equal_charts() {
    let mut a = live_chart(Vec::new());
    let mut b = live_chart(Vec::new());
    a.apply_live_points(1, vec![[0.0, 1.0]]);
    b.apply_live_points(2, vec![[0.0, 1.0]]);
    assert_ne!(a, b);
}
