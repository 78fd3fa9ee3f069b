//! Supervised (features, target) tables for model fitting

use super::{features_at, FeatureRow};
use crate::data::HourlySeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Ordered training rows, one per hour whose target and features all exist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupervisedTable {
    timestamps: Vec<DateTime<Utc>>,
    rows: Vec<FeatureRow>,
    targets: Vec<f64>,
}

impl SupervisedTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Target timestamps in ascending order
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Feature rows aligned with [`Self::timestamps`]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Targets aligned with [`Self::timestamps`]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Dense feature matrix, one inner vector per row
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::to_vec).collect()
    }

    /// Split off the last `holdout` rows, keeping time order
    pub fn split_tail(&self, holdout: usize) -> Result<(Self, Self)> {
        if self.len() < holdout {
            return Err(ForecastError::InsufficientHistoryError {
                needed: holdout,
                got: self.len(),
            });
        }

        let cut = self.len() - holdout;
        let head = Self {
            timestamps: self.timestamps[..cut].to_vec(),
            rows: self.rows[..cut].to_vec(),
            targets: self.targets[..cut].to_vec(),
        };
        let tail = Self {
            timestamps: self.timestamps[cut..].to_vec(),
            rows: self.rows[cut..].to_vec(),
            targets: self.targets[cut..].to_vec(),
        };
        Ok((head, tail))
    }
}

/// Turn an hourly series into a leak-free supervised table
///
/// Hours without a target, or with any lag or rolling input missing, are
/// dropped. This always excludes the first 168 hours and every hour whose
/// dependencies touch a gap.
pub fn build_supervised(series: &HourlySeries) -> SupervisedTable {
    let mut table = SupervisedTable::default();

    for (ts, target) in series.timestamps().zip(series.values().iter()) {
        let Some(y) = *target else {
            continue;
        };
        let row = features_at(series, ts);
        if !row.is_complete() {
            continue;
        }
        table.timestamps.push(ts);
        table.rows.push(row);
        table.targets.push(y);
    }

    debug!(
        hours = series.len(),
        rows = table.len(),
        dropped = series.len() - table.len(),
        "built supervised table"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ramp(n: usize) -> HourlySeries {
        let start = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        HourlySeries::from_values(start, &values).unwrap()
    }

    #[test]
    fn test_first_week_is_dropped() {
        let series = ramp(200);
        let table = build_supervised(&series);

        assert_eq!(table.len(), 32);
        assert_eq!(table.timestamps()[0], series.timestamp_at(168));
        assert_eq!(table.targets()[0], 168.0);
    }

    #[test]
    fn test_split_tail_keeps_order() {
        let table = build_supervised(&ramp(200));
        let (train, test) = table.split_tail(10).unwrap();

        assert_eq!(train.len(), 22);
        assert_eq!(test.len(), 10);
        assert!(train.timestamps().last().unwrap() < &test.timestamps()[0]);
    }

    #[test]
    fn test_split_tail_rejects_small_tables() {
        let table = build_supervised(&ramp(200));
        assert!(matches!(
            table.split_tail(33),
            Err(ForecastError::InsufficientHistoryError { needed: 33, got: 32 })
        ));
    }
}
