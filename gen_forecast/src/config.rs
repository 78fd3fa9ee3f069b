//! Runtime configuration
//!
//! Every field has a default, so a JSON file only needs the keys it overrides.

use crate::error::{ForecastError, Result};
use crate::models::{GradientBoostingConfig, DEFAULT_SEASON_HOURS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hours in one forecast day
pub const HOURS_PER_DAY: usize = 24;

/// How the recursive forecaster treats inference features that fall in a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Hand the incomplete row to the model and log the degradation
    #[default]
    PassThrough,
    /// Abort the forecast with `MissingFeatureError`
    FailFast,
}

/// Paths, horizons and model settings for one deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Canonical hourly `timestamp,value` CSV
    pub data_path: PathBuf,
    /// Fitted model artifact
    pub model_path: PathBuf,
    /// Run metadata artifact
    pub metadata_path: PathBuf,
    /// Baseline season period in hours
    pub season_period: usize,
    /// Evaluation window in hours
    pub holdout_hours: usize,
    /// Largest horizon a request may ask for
    pub max_horizon: usize,
    /// Largest number of days a request may ask for
    pub max_days: usize,
    pub model_version: String,
    pub gap_policy: GapPolicy,
    pub boosting: GradientBoostingConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/processed/generation_de_hourly.csv"),
            model_path: PathBuf::from("models/model.json"),
            metadata_path: PathBuf::from("models/metadata.json"),
            season_period: DEFAULT_SEASON_HOURS,
            holdout_hours: DEFAULT_SEASON_HOURS,
            max_horizon: 744,
            max_days: 31,
            model_version: "v1".to_string(),
            gap_policy: GapPolicy::default(),
            boosting: GradientBoostingConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Load a configuration file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::MissingDataError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path)?;
        let config: ForecastConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the settings
    pub fn validate(&self) -> Result<()> {
        if self.season_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "season_period must be positive".to_string(),
            ));
        }
        if self.holdout_hours == 0 {
            return Err(ForecastError::InvalidParameter(
                "holdout_hours must be positive".to_string(),
            ));
        }
        if self.max_horizon == 0 || self.max_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_horizon and max_days must be positive".to_string(),
            ));
        }
        self.boosting.validate()
    }

    /// Accept a requested horizon in hours, or reject it before any work runs
    pub fn validate_horizon(&self, horizon: usize) -> Result<usize> {
        if horizon == 0 || horizon > self.max_horizon {
            return Err(ForecastError::ValidationError(format!(
                "horizon must be between 1 and {}, got {}",
                self.max_horizon, horizon
            )));
        }
        Ok(horizon)
    }

    /// Horizon in hours for a request expressed in days
    pub fn horizon_for_days(&self, days: usize) -> Result<usize> {
        if days == 0 || days > self.max_days {
            return Err(ForecastError::ValidationError(format!(
                "days must be between 1 and {}, got {}",
                self.max_days, days
            )));
        }
        Ok(days * HOURS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ForecastConfig =
            serde_json::from_str(r#"{"holdout_hours": 48, "gap_policy": "fail_fast"}"#).unwrap();
        assert_eq!(config.holdout_hours, 48);
        assert_eq!(config.gap_policy, GapPolicy::FailFast);
        assert_eq!(config.season_period, 168);
        assert_eq!(config.boosting, GradientBoostingConfig::default());
    }

    #[test]
    fn test_horizon_bounds() {
        let config = ForecastConfig::default();
        assert_eq!(config.validate_horizon(1).unwrap(), 1);
        assert_eq!(config.validate_horizon(744).unwrap(), 744);
        assert_eq!(
            config.validate_horizon(0).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert!(config.validate_horizon(745).is_err());
    }

    #[test]
    fn test_days_to_horizon() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon_for_days(7).unwrap(), 168);
        assert_eq!(config.horizon_for_days(31).unwrap(), 744);
        assert!(config.horizon_for_days(0).is_err());
        assert!(config.horizon_for_days(32).is_err());
    }

    #[test]
    fn test_zero_season_rejected() {
        let config = ForecastConfig {
            season_period: 0,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
