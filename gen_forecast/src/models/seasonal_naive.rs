//! Seasonal naive baseline

use crate::data::HourlySeries;
use crate::error::{ForecastError, Result};
use chrono::Duration;
use tracing::debug;

/// Default season: the same hour one week earlier
pub const DEFAULT_SEASON_HOURS: usize = 168;

/// Forecasts each future hour with the value observed one season earlier
///
/// Missing references are forward-filled from earlier predictions; anything
/// still missing after that takes the last observed value of the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonalNaive {
    period: usize,
}

impl SeasonalNaive {
    /// Create a baseline with a season of `period` hours
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Season period must be positive".to_string(),
            ));
        }

        Ok(Self { period })
    }

    /// Season length in hours
    pub fn period(&self) -> usize {
        self.period
    }

    /// Predict the `horizon` hours following the last timestamp of `series`
    pub fn forecast(&self, series: &HourlySeries, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::ValidationError(
                "Horizon must be at least one hour".to_string(),
            ));
        }
        let fallback = series.last_observed().ok_or_else(|| {
            ForecastError::MissingDataError("Series has no observed values".to_string())
        })?;

        let last = series.last_timestamp();
        let season = Duration::hours(self.period as i64);
        let mut predictions: Vec<Option<f64>> = (1..=horizon)
            .map(|h| series.get(last + Duration::hours(h as i64) - season))
            .collect();

        let mut forward_filled = 0;
        let mut carried = None;
        for slot in predictions.iter_mut() {
            if slot.is_some() {
                carried = *slot;
            } else if carried.is_some() {
                *slot = carried;
                forward_filled += 1;
            }
        }

        let last_value_filled = predictions.iter().filter(|p| p.is_none()).count();
        debug!(
            period = self.period,
            horizon,
            forward_filled,
            last_value_filled,
            "seasonal naive forecast"
        );

        Ok(predictions
            .into_iter()
            .map(|p| p.unwrap_or(fallback))
            .collect())
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self {
            period: DEFAULT_SEASON_HOURS,
        }
    }
}
