//! Training and holdout evaluation

use crate::data::{hours_between, HourlySeries};
use crate::error::{ForecastError, Result};
use crate::features::{build_supervised, feature_names};
use crate::models::{FittedModel, Regressor, SeasonalNaive, DEFAULT_SEASON_HOURS};
use crate::utils::improvement_pct;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_math::{forecast_accuracy, mean_absolute_error, ForecastAccuracy};
use tracing::{debug, info, warn};

/// Default evaluation window: the final week
pub const DEFAULT_HOLDOUT_HOURS: usize = 168;

/// Record of one training run, read by the serving layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub model_version: String,
    /// Source of the training series
    pub data_file: Option<String>,
    /// Last training row, `None` when every row went to the holdout
    pub train_end: Option<DateTime<Utc>>,
    pub test_start: DateTime<Utc>,
    pub test_end: DateTime<Utc>,
    pub mae_model: f64,
    pub mae_baseline: f64,
    pub improvement_pct: f64,
    /// Feature schema in model input order
    pub features: Vec<String>,
    pub notes: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model_metrics: ForecastAccuracy,
    pub baseline_metrics: ForecastAccuracy,
}

impl RunMetadata {
    /// Fail if the recorded feature list differs from the current schema
    pub fn validate_schema(&self) -> Result<()> {
        if self.features != feature_names() {
            return Err(ForecastError::ModelError(format!(
                "Run {} recorded features [{}], expected [{}]",
                self.model_version,
                self.features.join(", "),
                feature_names().join(", ")
            )));
        }
        Ok(())
    }
}

/// Fitted model together with its run metadata
#[derive(Debug, Clone)]
pub struct TrainingOutcome<F> {
    pub model: F,
    pub metadata: RunMetadata,
}

/// Fits a regressor on a temporal split and scores it against the baseline
#[derive(Debug, Clone)]
pub struct TrainingHarness<R> {
    regressor: R,
    holdout: usize,
    season_period: usize,
    model_version: String,
    data_file: Option<String>,
    notes: String,
}

impl<R: Regressor> TrainingHarness<R> {
    pub fn new(regressor: R) -> Self {
        let notes = format!(
            "{} on lag + rolling + calendar features. Frequency hourly.",
            regressor.name()
        );
        Self {
            regressor,
            holdout: DEFAULT_HOLDOUT_HOURS,
            season_period: DEFAULT_SEASON_HOURS,
            model_version: "v1".to_string(),
            data_file: None,
            notes,
        }
    }

    /// Number of final rows held out for evaluation
    pub fn with_holdout(mut self, holdout: usize) -> Self {
        self.holdout = holdout;
        self
    }

    pub fn with_season_period(mut self, season_period: usize) -> Self {
        self.season_period = season_period;
        self
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    pub fn with_data_file(mut self, data_file: impl Into<String>) -> Self {
        self.data_file = Some(data_file.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Build the table, fit on all but the holdout rows and evaluate
    pub fn run(&self, series: &HourlySeries) -> Result<TrainingOutcome<R::Fitted>> {
        if self.holdout == 0 {
            return Err(ForecastError::InvalidParameter(
                "Holdout must be at least one row".to_string(),
            ));
        }

        let table = build_supervised(series);
        let (train, test) = table.split_tail(self.holdout)?;
        info!(
            rows = table.len(),
            train_rows = train.len(),
            test_rows = test.len(),
            "built supervised table"
        );

        let model = self.regressor.fit(train.rows(), train.targets())?;
        let predictions = test
            .rows()
            .iter()
            .map(|row| model.predict(row))
            .collect::<Result<Vec<f64>>>()?;
        let model_metrics = forecast_accuracy(&predictions, test.targets())?;

        let test_start = test.timestamps()[0];
        let test_end = test.timestamps()[test.len() - 1];
        let baseline = self.aligned_baseline(series, test.timestamps())?;
        let baseline_metrics = forecast_accuracy(&baseline, test.targets())?;

        let improvement = improvement_pct(baseline_metrics.mae, model_metrics.mae)
            .unwrap_or_else(|| {
                warn!("baseline MAE is zero; reporting 0% improvement");
                0.0
            });

        info!(
            mae_model = model_metrics.mae,
            mae_baseline = baseline_metrics.mae,
            improvement_pct = improvement,
            "evaluated on holdout"
        );

        let metadata = RunMetadata {
            model_version: self.model_version.clone(),
            data_file: self.data_file.clone(),
            train_end: train.timestamps().last().copied(),
            test_start,
            test_end,
            mae_model: model_metrics.mae,
            mae_baseline: baseline_metrics.mae,
            improvement_pct: improvement,
            features: feature_names(),
            notes: self.notes.clone(),
            train_rows: train.len(),
            test_rows: test.len(),
            model_metrics,
            baseline_metrics,
        };

        Ok(TrainingOutcome { model, metadata })
    }

    /// Baseline forecast from the history before the holdout, one value per
    /// holdout timestamp
    fn aligned_baseline(
        &self,
        series: &HourlySeries,
        timestamps: &[DateTime<Utc>],
    ) -> Result<Vec<f64>> {
        let test_start = timestamps[0];
        let test_end = timestamps[timestamps.len() - 1];
        let span = hours_between(test_start, test_end).ok_or_else(|| {
            ForecastError::ValidationError("Holdout timestamps are not hourly".to_string())
        })?;

        let history = series.truncate_before(test_start)?;
        let forecast =
            SeasonalNaive::new(self.season_period)?.forecast(&history, span as usize + 1)?;
        debug!(history = history.len(), horizon = forecast.len(), "baseline over holdout");

        timestamps
            .iter()
            .map(|ts| {
                hours_between(test_start, *ts)
                    .and_then(|offset| forecast.get(offset as usize).copied())
                    .ok_or_else(|| {
                        ForecastError::ValidationError(format!(
                            "Holdout timestamp {} is off the hourly grid",
                            ts
                        ))
                    })
            })
            .collect()
    }
}

/// Window and error of a standalone baseline evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineEvaluation {
    pub test_start: DateTime<Utc>,
    pub test_end: DateTime<Utc>,
    pub mae: f64,
}

/// Score the seasonal naive baseline on the last `holdout` hours of `series`
///
/// Needs at least two holdouts of history. Unobserved test hours are not scored.
pub fn evaluate_baseline(
    series: &HourlySeries,
    holdout: usize,
    period: usize,
) -> Result<BaselineEvaluation> {
    if holdout == 0 {
        return Err(ForecastError::InvalidParameter(
            "Holdout must be at least one hour".to_string(),
        ));
    }
    let needed = 2 * holdout;
    if series.len() < needed {
        return Err(ForecastError::InsufficientHistoryError {
            needed,
            got: series.len(),
        });
    }

    let test_start = series.timestamp_at(series.len() - holdout);
    let history = series.truncate_before(test_start)?;
    let forecast = SeasonalNaive::new(period)?.forecast(&history, holdout)?;

    let (predicted, actual): (Vec<f64>, Vec<f64>) = forecast
        .iter()
        .zip(&series.values()[series.len() - holdout..])
        .filter_map(|(f, a)| a.map(|a| (*f, a)))
        .unzip();
    if actual.is_empty() {
        return Err(ForecastError::MissingDataError(
            "No observed values in the test window".to_string(),
        ));
    }

    let mae = mean_absolute_error(&predicted, &actual)?;
    info!(%test_start, mae, "baseline evaluation");

    Ok(BaselineEvaluation {
        test_start,
        test_end: series.last_timestamp(),
        mae,
    })
}
