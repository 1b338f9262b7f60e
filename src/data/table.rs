//! Tabular sample data: a timestamp column plus named numeric columns.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{DashboardError, DashboardResult};

/// One sample row. `values[i]` belongs to `Table::columns()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl Row {
    pub fn new(timestamp: NaiveDateTime, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }
}

/// Rows ordered by non-decreasing timestamp.
///
/// The ordering is established on construction (stable sort), so rows that
/// share a timestamp keep their source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table. Rows with a value count different from the column count
    /// are padded with `None` or truncated.
    pub fn new(columns: Vec<String>, mut rows: Vec<Row>) -> Self {
        let width = columns.len();
        for row in rows.iter_mut() {
            row.values.resize(width, None);
        }
        rows.sort_by_key(|r| r.timestamp);
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Fail with [`DashboardError::MissingColumns`] listing every absent name.
    pub fn require_columns(&self, names: &[&str]) -> DashboardResult<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.column_index(n).is_none())
            .map(|n| n.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DashboardError::MissingColumns(missing))
        }
    }

    /// `(timestamp, value)` pairs of one column, missing values included.
    pub fn series(&self, column: &str) -> DashboardResult<Vec<(NaiveDateTime, Option<f64>)>> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| DashboardError::MissingColumns(vec![column.to_string()]))?;
        Ok(self.rows.iter().map(|r| (r.timestamp, r.values[idx])).collect())
    }

    /// The most recent non-missing value of a column.
    pub fn last_valid(&self, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .rev()
            .find_map(|r| r.values[idx].filter(|v| v.is_finite()))
    }

    /// Distinct calendar dates present in the table, ascending.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.timestamp.date()).collect();
        dates.dedup();
        dates
    }

    /// Keep only rows matching `keep`, preserving order and columns.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
