//! Recursive multi-step forecasting
//!
//! Each step builds its features from the working series, asks the model for
//! one value and appends it before the next step runs. The seasonal baseline
//! is computed once from the observed series and never sees those values.

use crate::config::GapPolicy;
use crate::data::HourlySeries;
use crate::error::{ForecastError, Result};
use crate::features::point_features;
use crate::models::{FittedModel, SeasonalNaive, DEFAULT_SEASON_HOURS};
use crate::utils::future_timestamps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

/// Unit label attached to every served forecast
pub const FORECAST_UNIT: &str = "MWh (per hour interval)";

/// One forecast hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    /// Model prediction
    pub yhat: f64,
    /// Seasonal naive prediction
    pub baseline: f64,
}

/// Model and baseline predictions over a contiguous horizon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    points: Vec<ForecastPoint>,
    /// Steps whose features were incomplete when predicted
    degraded: Vec<DateTime<Utc>>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Model predictions in time order
    pub fn model_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.yhat).collect()
    }

    /// Baseline predictions in time order
    pub fn baseline_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.baseline).collect()
    }

    /// Timestamps predicted from gap-degraded features
    pub fn degraded_steps(&self) -> &[DateTime<Utc>] {
        &self.degraded
    }

    /// Write `timestamp,yhat,baseline` rows with a header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["timestamp", "yhat", "baseline"])?;
        for point in &self.points {
            csv_writer.write_record([
                point.timestamp.to_rfc3339(),
                point.yhat.to_string(),
                point.baseline.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Drives a fitted model through a multi-step horizon
#[derive(Debug, Clone, Copy)]
pub struct RecursiveForecaster<'a> {
    model: &'a dyn FittedModel,
    season_period: usize,
    gap_policy: GapPolicy,
}

impl<'a> RecursiveForecaster<'a> {
    pub fn new(model: &'a dyn FittedModel) -> Self {
        Self {
            model,
            season_period: DEFAULT_SEASON_HOURS,
            gap_policy: GapPolicy::default(),
        }
    }

    /// Season period used by the comparison baseline
    pub fn with_season_period(mut self, season_period: usize) -> Self {
        self.season_period = season_period;
        self
    }

    /// Treatment of features that fall in data gaps
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Forecast the `horizon` hours after the last timestamp of `series`
    pub fn forecast(&self, series: &HourlySeries, horizon: usize) -> Result<ForecastTable> {
        if horizon == 0 {
            return Err(ForecastError::ValidationError(
                "Horizon must be at least one hour".to_string(),
            ));
        }

        let baseline = SeasonalNaive::new(self.season_period)?.forecast(series, horizon)?;

        let mut working = series.clone();
        let mut table = ForecastTable {
            points: Vec::with_capacity(horizon),
            degraded: Vec::new(),
        };

        for (ts, base) in future_timestamps(series.last_timestamp(), horizon)
            .into_iter()
            .zip(baseline)
        {
            let row = point_features(&working, ts)?;

            let missing = row.missing_features();
            if !missing.is_empty() {
                match self.gap_policy {
                    GapPolicy::FailFast => {
                        return Err(ForecastError::MissingFeatureError {
                            timestamp: ts,
                            features: missing.iter().map(|name| name.to_string()).collect(),
                        });
                    }
                    GapPolicy::PassThrough => {
                        warn!(timestamp = %ts, features = ?missing, "forecasting with missing features");
                        table.degraded.push(ts);
                    }
                }
            }

            let yhat = self.model.predict(&row)?;
            if !yhat.is_finite() {
                return Err(ForecastError::ModelError(format!(
                    "{} returned a non-finite prediction at {}",
                    self.model.name(),
                    ts
                )));
            }

            working.push(ts, Some(yhat))?;
            table.points.push(ForecastPoint {
                timestamp: ts,
                yhat,
                baseline: base,
            });
        }

        debug!(
            model = self.model.name(),
            horizon,
            degraded = table.degraded.len(),
            "recursive forecast complete"
        );
        Ok(table)
    }
}

/// Forecast with the default season period and gap policy
pub fn forecast_horizon(
    series: &HourlySeries,
    model: &dyn FittedModel,
    horizon: usize,
) -> Result<ForecastTable> {
    RecursiveForecaster::new(model).forecast(series, horizon)
}
