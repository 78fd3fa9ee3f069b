//! Hourly series storage and loading

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Whole hours from `from` to `to`, or `None` if `to` is off the hourly grid
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<i64> {
    let millis = (to - from).num_milliseconds();
    if millis % MILLIS_PER_HOUR != 0 {
        return None;
    }
    Some(millis / MILLIS_PER_HOUR)
}

/// A strictly hourly series indexed by hour offset from its first timestamp
///
/// Gaps are stored as `None` and never dropped, so `ts - k hours` is always a
/// plain offset lookup. The series only grows: appending past the end fills
/// the skipped hours with `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    start: DateTime<Utc>,
    values: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Create a series from a start timestamp and one slot per hour
    ///
    /// Non-finite values are treated as missing.
    pub fn new(start: DateTime<Utc>, values: Vec<Option<f64>>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::MissingDataError(
                "An hourly series needs at least one hour".to_string(),
            ));
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();

        Ok(Self { start, values })
    }

    /// Create a gap-free series from plain values (NaN marks a gap)
    pub fn from_values(start: DateTime<Utc>, values: &[f64]) -> Result<Self> {
        Self::new(start, values.iter().map(|v| Some(*v)).collect())
    }

    /// Coerce unordered observations onto a strict hourly index
    ///
    /// Hours absent from `observations` become gaps. Duplicate timestamps and
    /// timestamps that are not a whole number of hours from the earliest one
    /// are rejected.
    pub fn from_observations(mut observations: Vec<(DateTime<Utc>, Option<f64>)>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::MissingDataError(
                "No observations to build a series from".to_string(),
            ));
        }

        observations.sort_by_key(|(ts, _)| *ts);
        let start = observations[0].0;
        let last = observations[observations.len() - 1].0;
        let span = hours_between(start, last).ok_or_else(|| {
            ForecastError::ValidationError(format!(
                "Timestamp {} is not on the hourly grid starting at {}",
                last, start
            ))
        })? as usize;

        let mut values = vec![None; span + 1];
        let mut seen = vec![false; span + 1];
        for (ts, value) in observations {
            let offset = hours_between(start, ts).ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "Timestamp {} is not on the hourly grid starting at {}",
                    ts, start
                ))
            })? as usize;
            if seen[offset] {
                return Err(ForecastError::ValidationError(format!(
                    "Duplicate timestamp {}",
                    ts
                )));
            }
            seen[offset] = true;
            values[offset] = value;
        }

        Self::new(start, values)
    }

    /// First timestamp of the index
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last timestamp of the index (observed or not)
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(self.values.len() - 1)
    }

    /// Number of hourly slots, including gaps
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A series always holds at least one slot
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw slots in index order
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Timestamp of slot `offset`
    pub fn timestamp_at(&self, offset: usize) -> DateTime<Utc> {
        self.start + Duration::hours(offset as i64)
    }

    /// Iterate over the full hourly index
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.values.len()).map(move |i| self.timestamp_at(i))
    }

    /// Hour offset of `ts` relative to the start (may lie outside the index)
    pub fn offset_of(&self, ts: DateTime<Utc>) -> Option<i64> {
        hours_between(self.start, ts)
    }

    /// Value at `ts`, `None` for gaps and for timestamps outside the index
    pub fn get(&self, ts: DateTime<Utc>) -> Option<f64> {
        let offset = self.offset_of(ts)?;
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied().flatten()
    }

    /// The `width` hourly slots strictly before `ts`
    ///
    /// `None` when the window would start before the series or reach past its
    /// end; such a window cannot be complete.
    pub fn window_before(&self, ts: DateTime<Utc>, width: usize) -> Option<&[Option<f64>]> {
        let end = self.offset_of(ts)?;
        let begin = end - width as i64;
        if begin < 0 || end > self.values.len() as i64 {
            return None;
        }
        Some(&self.values[begin as usize..end as usize])
    }

    /// Append `value` at `ts`, which must lie after the current last timestamp
    pub fn push(&mut self, ts: DateTime<Utc>, value: Option<f64>) -> Result<()> {
        let offset = self.offset_of(ts).ok_or_else(|| {
            ForecastError::ValidationError(format!(
                "Timestamp {} is not on the hourly grid starting at {}",
                ts, self.start
            ))
        })?;
        if offset < self.values.len() as i64 {
            return Err(ForecastError::ValidationError(format!(
                "Cannot append {}: series already extends to {}",
                ts,
                self.last_timestamp()
            )));
        }

        self.values.resize(offset as usize, None);
        self.values.push(value.filter(|x| x.is_finite()));
        Ok(())
    }

    /// Number of hours holding an observation
    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Most recent observed value
    pub fn last_observed(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    /// Copy of the series restricted to hours strictly before `ts`
    pub fn truncate_before(&self, ts: DateTime<Utc>) -> Result<Self> {
        let offset = self.offset_of(ts).ok_or_else(|| {
            ForecastError::ValidationError(format!(
                "Timestamp {} is not on the hourly grid starting at {}",
                ts, self.start
            ))
        })?;
        let keep = offset.clamp(0, self.values.len() as i64) as usize;
        if keep == 0 {
            return Err(ForecastError::MissingDataError(format!(
                "No history before {}",
                ts
            )));
        }

        Ok(Self {
            start: self.start,
            values: self.values[..keep].to_vec(),
        })
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC
///
/// Accepts pandas-style `2025-12-01 00:00:00+00:00`; timestamps without an
/// offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Ok(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(ForecastError::ValidationError(format!(
        "Unrecognised timestamp '{}'",
        raw
    )))
}

/// Data loader for the canonical `timestamp,value` hourly table
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load an hourly series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<HourlySeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::MissingDataError(format!(
                "Processed data not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Build an hourly series from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<HourlySeries> {
        let time_column = Self::detect_column(df, &["timestamp", "time", "date"])?;
        let value_column = Self::detect_column(df, &["value", "generation", "mwh"])?;

        let times = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let values = df.column(&value_column)?.cast(&DataType::Float64)?;
        let times = times.utf8()?;
        let values = values.f64()?;

        let mut observations = Vec::with_capacity(df.height());
        for (raw_ts, value) in times.into_iter().zip(values.into_iter()) {
            let raw_ts = raw_ts.ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "Empty value in column '{}'",
                    time_column
                ))
            })?;
            observations.push((parse_timestamp(raw_ts)?, value));
        }

        HourlySeries::from_observations(observations)
    }

    /// Find the first column whose name contains one of `candidates`
    fn detect_column(df: &DataFrame, candidates: &[&str]) -> Result<String> {
        let column_names = df.get_column_names();

        for candidate in candidates {
            for name in &column_names {
                if name.to_lowercase().contains(candidate) {
                    return Ok(name.to_string());
                }
            }
        }

        Err(ForecastError::MissingDataError(format!(
            "No column matching any of {:?} found in data",
            candidates
        )))
    }
}
