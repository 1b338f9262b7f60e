//! CSV decoding into [`Table`]s.
//!
//! Headers are matched by name after trimming (a leading UTF-8 BOM is ignored).
//! Rows whose timestamp cannot be parsed are dropped. Numeric cells that are
//! empty, `nan`, `null` or otherwise unparseable become `None`.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::data::table::{Row, Table};
use crate::error::{DashboardError, DashboardResult};

/// Which columns a feed is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSchema {
    /// Name of the timestamp column.
    pub timestamp_column: String,
    /// Value columns that must be present. Extra columns in the file are ignored.
    pub value_columns: Vec<String>,
}

impl FeedSchema {
    pub fn new<S: Into<String>>(timestamp_column: S, value_columns: &[&str]) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            value_columns: value_columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Forecast feed: `datetime`, `predicted_pv`.
    pub fn forecast() -> Self {
        Self::new("datetime", &["predicted_pv"])
    }

    /// Weather feed: `datetime`, `ghi`, `cloud_opacity`, `air_temp`.
    pub fn weather() -> Self {
        Self::new("datetime", &["ghi", "cloud_opacity", "air_temp"])
    }

    /// Live generation feed: `Timestamp`, `PV_P (W)`.
    pub fn live_power() -> Self {
        Self::new("Timestamp", &["PV_P (W)"])
    }

    /// Ambient sensor feed: `datetime`, `temperature`, `humidity`.
    pub fn ambient() -> Self {
        Self::new("datetime", &["temperature", "humidity"])
    }
}

/// Decode CSV from any reader according to `schema`.
pub fn parse_csv<R: Read>(reader: R, schema: &FeedSchema) -> DashboardResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let find = |name: &str| headers.iter().position(|h| h == name);

    let mut missing = Vec::new();
    let ts_idx = find(&schema.timestamp_column);
    if ts_idx.is_none() {
        missing.push(schema.timestamp_column.clone());
    }
    let value_idx: Vec<Option<usize>> = schema.value_columns.iter().map(|c| find(c)).collect();
    for (name, idx) in schema.value_columns.iter().zip(&value_idx) {
        if idx.is_none() {
            missing.push(name.clone());
        }
    }
    let ts_idx = match ts_idx {
        Some(i) if missing.is_empty() => i,
        _ => return Err(DashboardError::MissingColumns(missing)),
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let Some(timestamp) = record.get(ts_idx).and_then(parse_timestamp) else {
            dropped += 1;
            continue;
        };
        let values = value_idx
            .iter()
            .map(|idx| idx.and_then(|i| record.get(i)).and_then(parse_value))
            .collect();
        rows.push(Row::new(timestamp, values));
    }
    if dropped > 0 {
        tracing::debug!(dropped, "dropped rows with unparseable timestamps");
    }

    Ok(Table::new(schema.value_columns.clone(), rows))
}

/// Parse a timestamp cell. Offsets are discarded: the wall-clock time as
/// written in the file is kept.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Some(ts) = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(cell, f).ok())
    {
        return Some(ts);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
