//! Regression capability and baseline forecasters
//!
//! The forecasting core only ever talks to a [`FittedModel`]. Which learning
//! algorithm produced it is irrelevant to feature building and recursion.

use crate::error::Result;
use crate::features::FeatureRow;
use std::fmt::Debug;

pub mod gradient_boosting;
pub mod seasonal_naive;
mod tree;

pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor, TrainedGradientBoosting};
pub use seasonal_naive::{SeasonalNaive, DEFAULT_SEASON_HOURS};

/// A fitted model mapping one feature row to one prediction
///
/// Loaded once and shared by every request, so it must be usable from
/// several threads at once.
pub trait FittedModel: Debug + Send + Sync {
    /// Predict the target for a single row
    ///
    /// Missing lag/rolling inputs reach the model as-is; how they affect the
    /// output is the model's own policy.
    fn predict(&self, row: &FeatureRow) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Learning algorithm that can be fitted on a supervised table
pub trait Regressor: Debug {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit on feature rows and their targets
    fn fit(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Fitted>;

    /// Name of the algorithm
    fn name(&self) -> &str;
}
