//! # Gen Forecast
//!
//! Hourly electricity-generation forecasting from the series' own history.
//!
//! ## Features
//!
//! - Gap-preserving hourly series with O(1) offset lookups
//! - Leak-free lag, rolling and calendar features shared by training and inference
//! - Seasonal naive baseline with forward-fill and last-value fallback
//! - Recursive multi-step forecasting that feeds predictions back as history
//! - Temporal holdout evaluation against the baseline, with JSON run metadata
//! - A native histogram gradient-boosted tree regressor
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gen_forecast::data::DataLoader;
//! use gen_forecast::forecast::RecursiveForecaster;
//! use gen_forecast::models::GradientBoostingRegressor;
//! use gen_forecast::training::TrainingHarness;
//!
//! # fn main() -> gen_forecast::error::Result<()> {
//! // Load data
//! let series = DataLoader::from_csv("data/processed/generation_de_hourly.csv")?;
//!
//! // Fit on everything but the final week and score against the baseline
//! let outcome = TrainingHarness::new(GradientBoostingRegressor::default()).run(&series)?;
//! println!("improvement: {:.1}%", outcome.metadata.improvement_pct);
//!
//! // Forecast the next day
//! let table = RecursiveForecaster::new(&outcome.model).forecast(&series, 24)?;
//! for point in table.points() {
//!     println!("{} {:.0} {:.0}", point.timestamp, point.yhat, point.baseline);
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod models;
pub mod training;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, GapPolicy};
pub use crate::data::{DataLoader, HourlySeries};
pub use crate::error::{ErrorKind, ForecastError};
pub use crate::features::{FeatureRow, SupervisedTable, FEATURE_NAMES};
pub use crate::forecast::{ForecastTable, RecursiveForecaster, FORECAST_UNIT};
pub use crate::models::{FittedModel, Regressor};
pub use crate::training::{RunMetadata, TrainingHarness};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
