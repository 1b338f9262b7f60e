//! Table transforms: inclusive date-range filtering and fixed-cadence
//! resampling.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

use crate::data::table::Table;
use crate::error::{DashboardError, DashboardResult};

/// Rows whose date component lies in `[start, end]` (both inclusive).
///
/// Reversed bounds are swapped. An empty result is a valid outcome.
pub fn filter_date_range(table: &Table, start: NaiveDate, end: NaiveDate) -> Table {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    table.retain_rows(|r| {
        let d = r.timestamp.date();
        lo <= d && d <= hi
    })
}

/// One resampled row: the bucket's start and the mean of the readings inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Inclusive start of `[start, start + width)`.
    pub start: NaiveDateTime,
    pub mean: f64,
    /// Number of readings averaged.
    pub count: usize,
}

/// Milliseconds since the UNIX epoch, treating the naive timestamp as UTC.
pub fn epoch_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

/// Inverse of [`epoch_millis`].
pub fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Start of the grid cell containing `ts`, for cells of `width` aligned to the
/// UNIX epoch.
pub fn bucket_start(ts: NaiveDateTime, width: TimeDelta) -> DashboardResult<NaiveDateTime> {
    let w = positive_width_ms(width)?;
    let ms = epoch_millis(ts);
    let aligned = ms - ms.rem_euclid(w);
    from_epoch_millis(aligned).ok_or(DashboardError::InvalidBucket(w))
}

/// Mean of `column` per epoch-aligned bucket of `width`.
///
/// Missing readings do not count towards a bucket's mean; a bucket without any
/// valid reading is omitted rather than zero-filled. With `up_to` set, rows
/// later than that instant are ignored. Output is ordered by bucket start.
pub fn resample_mean(
    table: &Table,
    column: &str,
    width: TimeDelta,
    up_to: Option<NaiveDateTime>,
) -> DashboardResult<Vec<Bucket>> {
    let w = positive_width_ms(width)?;
    let series = table.series(column)?;

    let mut acc: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (ts, value) in series {
        if up_to.is_some_and(|limit| ts > limit) {
            continue;
        }
        let Some(v) = value else { continue };
        let ms = epoch_millis(ts);
        let key = ms - ms.rem_euclid(w);
        let slot = acc.entry(key).or_insert((0.0, 0));
        slot.0 += v;
        slot.1 += 1;
    }

    Ok(acc
        .into_iter()
        .filter_map(|(key, (sum, count))| {
            Some(Bucket {
                start: from_epoch_millis(key)?,
                mean: sum / count as f64,
                count,
            })
        })
        .collect())
}

fn positive_width_ms(width: TimeDelta) -> DashboardResult<i64> {
    let w = width.num_milliseconds();
    if w <= 0 {
        Err(DashboardError::InvalidBucket(w))
    } else {
        Ok(w)
    }
}
