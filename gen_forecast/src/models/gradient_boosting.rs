//! Gradient boosted regression trees
//!
//! Least-squares boosting over quantile-binned features. Each round fits a
//! depth-limited tree to the current residuals and adds it with shrinkage.
//! Missing inputs are routed per split, so rows with gap-degraded features
//! still receive a prediction.

use super::tree::{FeatureBinner, TreeBuilder, TreeNode, TreeParams};
use super::{FittedModel, Regressor};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, FEATURE_NAMES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Gradient Boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Maximum number of histogram bins per feature
    pub max_bins: usize,
    /// L2 regularization on leaf values
    pub l2_regularization: f64,
    /// Row subsample ratio for each tree
    pub subsample: f64,
    /// Random seed for row subsampling
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 20,
            max_bins: 255,
            l2_regularization: 0.0,
            subsample: 1.0,
            random_state: Some(42),
        }
    }
}

impl GradientBoostingConfig {
    /// Reject settings the booster cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "learning_rate must be in (0, 1]".to_string(),
            ));
        }
        if self.max_depth == 0 || self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth and min_samples_leaf must be positive".to_string(),
            ));
        }
        if !(2..=1024).contains(&self.max_bins) {
            return Err(ForecastError::InvalidParameter(
                "max_bins must be between 2 and 1024".to_string(),
            ));
        }
        if self.l2_regularization < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "l2_regularization must not be negative".to_string(),
            ));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "subsample must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Gradient Boosting Regressor
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    /// Name of the model
    name: String,
    config: GradientBoostingConfig,
}

/// Fitted gradient boosting ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedGradientBoosting {
    /// Name of the model
    name: String,
    learning_rate: f64,
    initial_prediction: f64,
    trees: Vec<TreeNode>,
    /// Schema the ensemble was fitted on
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
    n_training_rows: usize,
}

impl GradientBoostingRegressor {
    /// Create a new regressor after validating its configuration
    pub fn new(config: GradientBoostingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: format!(
                "Gradient Boosting (trees={}, depth={}, lr={})",
                config.n_estimators, config.max_depth, config.learning_rate
            ),
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.config.max_depth,
            min_samples_leaf: self.config.min_samples_leaf,
            l2_regularization: self.config.l2_regularization,
        }
    }

    fn subsample_indices(&self, n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        if self.config.subsample >= 1.0 {
            return indices;
        }
        let sample_size = ((n as f64) * self.config.subsample).ceil() as usize;
        indices.shuffle(rng);
        indices.truncate(sample_size.max(1));
        indices.sort_unstable();
        indices
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        let config = GradientBoostingConfig::default();
        Self {
            name: format!(
                "Gradient Boosting (trees={}, depth={}, lr={})",
                config.n_estimators, config.max_depth, config.learning_rate
            ),
            config,
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    type Fitted = TrainedGradientBoosting;

    fn fit(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Fitted> {
        if rows.len() != targets.len() {
            return Err(ForecastError::ModelError(format!(
                "Got {} feature rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if targets.iter().any(|y| !y.is_finite()) {
            return Err(ForecastError::ModelError(
                "Targets must be finite".to_string(),
            ));
        }

        let n_samples = rows.len();
        let n_features = FEATURE_NAMES.len();
        if n_samples == 0 {
            warn!("no training rows; the fitted model predicts a constant 0.0");
            return Ok(TrainedGradientBoosting {
                name: self.name.clone(),
                learning_rate: self.config.learning_rate,
                initial_prediction: 0.0,
                trees: Vec::new(),
                feature_names: crate::features::feature_names(),
                feature_importances: vec![0.0; n_features],
                n_training_rows: 0,
            });
        }

        let matrix: Vec<Vec<f64>> = rows.iter().map(FeatureRow::to_vec).collect();
        let binner = FeatureBinner::fit(&matrix, n_features, self.config.max_bins);
        let binned = binner.transform(&matrix);

        // Initialize with mean
        let initial_prediction = targets.iter().sum::<f64>() / n_samples as f64;
        let mut predictions = vec![initial_prediction; n_samples];

        let mut rng = match self.config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut feature_importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(predictions.iter())
                .map(|(y, p)| y - p)
                .collect();

            let sample_indices = self.subsample_indices(n_samples, &mut rng);
            let mut builder = TreeBuilder::new(&binner, &binned, &residuals, self.tree_params());
            let tree = builder.build(&sample_indices);

            for (total, gain) in feature_importances.iter_mut().zip(builder.importances()) {
                *total += gain;
            }
            for (prediction, x) in predictions.iter_mut().zip(matrix.iter()) {
                if let Some(step) = tree.predict(x) {
                    *prediction += self.config.learning_rate * step;
                }
            }
            trees.push(tree);
        }

        // Normalize feature importances
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut feature_importances {
                *importance /= total;
            }
        }

        let train_mae = targets
            .iter()
            .zip(predictions.iter())
            .map(|(y, p)| (y - p).abs())
            .sum::<f64>()
            / n_samples as f64;
        info!(rows = n_samples, trees = trees.len(), train_mae, "fitted gradient boosting");
        debug!(?feature_importances, "feature importances");

        Ok(TrainedGradientBoosting {
            name: self.name.clone(),
            learning_rate: self.config.learning_rate,
            initial_prediction,
            trees,
            feature_names: crate::features::feature_names(),
            feature_importances,
            n_training_rows: n_samples,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoosting {
    /// Normalized loss reduction per feature, in schema order
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Schema the ensemble was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of rows the ensemble was fitted on
    pub fn n_training_rows(&self) -> usize {
        self.n_training_rows
    }

    /// Check a loaded ensemble against the current feature schema
    ///
    /// The stored names must equal [`FEATURE_NAMES`] in order and every split
    /// must refer to one of those columns.
    pub fn validate(&self) -> Result<()> {
        self.check_schema()?;

        let n_features = FEATURE_NAMES.len();
        for (idx, tree) in self.trees.iter().enumerate() {
            if let Some(feature) = tree.max_feature_idx().filter(|f| *f >= n_features) {
                return Err(ForecastError::ModelError(format!(
                    "Tree {} splits on feature {} but the schema has {} features",
                    idx, feature, n_features
                )));
            }
        }
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        if self
            .feature_names
            .iter()
            .map(String::as_str)
            .ne(FEATURE_NAMES.iter().copied())
        {
            return Err(ForecastError::ModelError(format!(
                "Model was fitted on features [{}], expected [{}]",
                self.feature_names.join(", "),
                FEATURE_NAMES.join(", ")
            )));
        }
        Ok(())
    }
}

impl FittedModel for TrainedGradientBoosting {
    fn predict(&self, row: &FeatureRow) -> Result<f64> {
        self.check_schema()?;

        let x = row.to_vec();
        let mut boost = 0.0;
        for tree in &self.trees {
            boost += tree.predict(&x).ok_or_else(|| {
                ForecastError::ModelError(format!(
                    "{} refers to a feature outside the {}-column schema",
                    self.name,
                    x.len()
                ))
            })?;
        }
        Ok(self.initial_prediction + self.learning_rate * boost)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
