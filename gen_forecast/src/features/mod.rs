//! Lag, rolling and calendar features for hourly forecasting
//!
//! Every feature row, whether it ends up in a training table or is built for
//! a single future hour during inference, comes from [`features_at`]. The
//! function only reads hours strictly before its target timestamp.

use crate::data::HourlySeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use series_math::{window_mean, window_std};

pub mod calendar;
pub mod supervised;

pub use calendar::{calendar_features, calendar_table, CalendarFeatures};
pub use supervised::{build_supervised, SupervisedTable};

/// Hour offsets used for lag features
pub const LAG_HOURS: [usize; 3] = [1, 24, 168];

/// Window used for the short rolling statistics
pub const SHORT_WINDOW: usize = 24;

/// Window used for the long rolling mean
pub const LONG_WINDOW: usize = 168;

/// Feature schema, in the column order models are fitted with
pub const FEATURE_NAMES: [&str; 11] = [
    "lag_1",
    "lag_24",
    "lag_168",
    "roll_mean_24",
    "roll_mean_168",
    "roll_std_24",
    "hour_sin",
    "hour_cos",
    "dow_sin",
    "dow_cos",
    "month",
];

/// Owned copy of [`FEATURE_NAMES`]
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
}

/// Features for exactly one target hour
///
/// Lag and rolling fields are `None` when the hours they depend on are gaps
/// or lie outside the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub lag_1: Option<f64>,
    pub lag_24: Option<f64>,
    pub lag_168: Option<f64>,
    pub roll_mean_24: Option<f64>,
    pub roll_mean_168: Option<f64>,
    pub roll_std_24: Option<f64>,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub dow_sin: f64,
    pub dow_cos: f64,
    pub month: u32,
}

impl FeatureRow {
    /// Values in [`FEATURE_NAMES`] order, `None` where missing
    pub fn values(&self) -> [Option<f64>; 11] {
        [
            self.lag_1,
            self.lag_24,
            self.lag_168,
            self.roll_mean_24,
            self.roll_mean_168,
            self.roll_std_24,
            Some(self.hour_sin),
            Some(self.hour_cos),
            Some(self.dow_sin),
            Some(self.dow_cos),
            Some(self.month as f64),
        ]
    }

    /// Dense vector in [`FEATURE_NAMES`] order with NaN for missing inputs
    pub fn to_vec(&self) -> Vec<f64> {
        self.values()
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }

    /// Look a feature up by schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|idx| self.values()[idx])
    }

    /// Names of the features that could not be computed
    pub fn missing_features(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .zip(self.values().iter())
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// True when no feature is missing
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| v.is_some())
    }
}

/// Build the feature row for `ts` from the history strictly before it
///
/// `ts` may sit inside the series (training) or after its end (inference);
/// the value at `ts` itself and anything later is never read.
pub fn features_at(series: &HourlySeries, ts: DateTime<Utc>) -> FeatureRow {
    let lag = |hours: usize| series.get(ts - Duration::hours(hours as i64));
    let short = series.window_before(ts, SHORT_WINDOW);
    let long = series.window_before(ts, LONG_WINDOW);
    let cal = calendar_features(ts);

    FeatureRow {
        lag_1: lag(LAG_HOURS[0]),
        lag_24: lag(LAG_HOURS[1]),
        lag_168: lag(LAG_HOURS[2]),
        roll_mean_24: short.and_then(window_mean),
        roll_mean_168: long.and_then(window_mean),
        roll_std_24: short.and_then(window_std),
        hour_sin: cal.hour_sin,
        hour_cos: cal.hour_cos,
        dow_sin: cal.dow_sin,
        dow_cos: cal.dow_cos,
        month: cal.month,
    }
}

/// Feature row for a future hour, one or more hours after the series ends
pub fn point_features(series: &HourlySeries, ts: DateTime<Utc>) -> Result<FeatureRow> {
    match series.offset_of(ts) {
        Some(offset) if offset >= series.len() as i64 => Ok(features_at(series, ts)),
        Some(_) => Err(ForecastError::ValidationError(format!(
            "Target {} must be after the last timestamp {}",
            ts,
            series.last_timestamp()
        ))),
        None => Err(ForecastError::ValidationError(format!(
            "Target {} is not on the hourly grid of the series",
            ts
        ))),
    }
}
