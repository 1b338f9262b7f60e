use std::io::Write;

use chrono::NaiveDate;
use pvdash::data::csv_table::{parse_csv, FeedSchema};
use pvdash::data::source::{resolve_url, DataSource, FileCsvSource, HttpCsvSource, StaticSource};
use pvdash::DashboardError;

const WEATHER: &str = "\
datetime,ghi,cloud_opacity,air_temp,extra
2024-06-01 10:00:00,500,20,18.5,x
2024-06-01 10:30:00,,35,nan,x
not a time,1,1,1,x
2024-06-01T11:00:00,650.5,10,21.25,x
";

#[test]
fn parse_weather_feed() {
    let table = parse_csv(WEATHER.as_bytes(), &FeedSchema::weather()).unwrap();
    assert_eq!(table.columns(), ["ghi", "cloud_opacity", "air_temp"]);
    assert_eq!(table.len(), 3, "row with unparseable timestamp is dropped");

    let second = &table.rows()[1];
    assert_eq!(second.values, vec![None, Some(35.0), None]);
    assert_eq!(
        table.rows()[2].timestamp,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(11, 0, 0).unwrap()
    );
}

#[test]
fn last_valid_skips_trailing_missing_values() {
    let csv = "datetime,ghi,cloud_opacity,air_temp\n\
               2024-06-01 10:00,1,1,17.0\n\
               2024-06-01 10:15,1,1,19.5\n\
               2024-06-01 10:30,1,1,\n";
    let table = parse_csv(csv.as_bytes(), &FeedSchema::weather()).unwrap();
    assert_eq!(table.last_valid("air_temp"), Some(19.5));
    assert_eq!(table.last_valid("unknown"), None);
}

#[test]
fn missing_columns_are_all_reported() {
    let csv = "datetime,ghi\n2024-06-01 10:00:00,1\n";
    let err = parse_csv(csv.as_bytes(), &FeedSchema::weather()).unwrap_err();
    match err {
        DashboardError::MissingColumns(cols) => {
            assert_eq!(cols, vec!["cloud_opacity".to_string(), "air_temp".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_timestamp_column_is_reported() {
    let csv = "time,predicted_pv\n2024-06-01 10:00:00,1\n";
    let err = parse_csv(csv.as_bytes(), &FeedSchema::forecast()).unwrap_err();
    assert_eq!(err.to_string(), "missing required column(s): datetime");
    assert!(!err.is_fetch_error());
}

#[test]
fn header_bom_and_whitespace_are_ignored() {
    let csv = "\u{feff}Timestamp , PV_P (W)\n2024-06-01 10:00:00, 1200\n";
    let table = parse_csv(csv.as_bytes(), &FeedSchema::live_power()).unwrap();
    assert_eq!(table.series("PV_P (W)").unwrap()[0].1, Some(1200.0));
}

#[test]
fn rows_are_sorted_by_timestamp() {
    let csv = "datetime,predicted_pv\n\
               2024-06-02 00:00:00,2\n\
               2024-06-01 00:00:00,1\n";
    let table = parse_csv(csv.as_bytes(), &FeedSchema::forecast()).unwrap();
    let values: Vec<_> = table.rows().iter().map(|r| r.values[0]).collect();
    assert_eq!(values, vec![Some(1.0), Some(2.0)]);
    assert_eq!(
        table.available_dates(),
        vec![
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        ]
    );
}

#[test]
fn header_only_feed_is_an_empty_table() {
    let table = parse_csv("datetime,predicted_pv\n".as_bytes(), &FeedSchema::forecast()).unwrap();
    assert!(table.is_empty());
    assert!(table.available_dates().is_empty());
}

#[test]
fn file_source_reads_csv_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "datetime,predicted_pv").unwrap();
    writeln!(file, "2024-06-01 12:00:00,3400").unwrap();
    let source = FileCsvSource::new(file.path(), FeedSchema::forecast());
    let table = source.fetch().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(source.describe(), file.path().display().to_string());
}

#[test]
fn file_source_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileCsvSource::new(dir.path().join("absent.csv"), FeedSchema::forecast());
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, DashboardError::Io { .. }));
    assert!(err.is_fetch_error());
}

#[test]
fn static_source_returns_its_table() {
    let table = parse_csv(WEATHER.as_bytes(), &FeedSchema::weather()).unwrap();
    let source = StaticSource::new(table.clone());
    assert_eq!(source.fetch().unwrap(), table);
}

#[test]
fn resolve_url_substitutes_or_appends_file_id() {
    assert_eq!(
        resolve_url("https://drive.google.com/uc?id={id}", "abc"),
        "https://drive.google.com/uc?id=abc"
    );
    assert_eq!(resolve_url("http://host/files/", "abc"), "http://host/files/abc");
    let source = HttpCsvSource::from_file_id("http://h/{id}.csv", "feed", FeedSchema::forecast());
    assert_eq!(source.url(), "http://h/feed.csv");
}
