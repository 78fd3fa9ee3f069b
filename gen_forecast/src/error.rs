//! Error types for the gen_forecast crate

use chrono::{DateTime, Utc};
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the gen_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required series or model artifact is absent
    #[error("Missing data: {0}")]
    MissingDataError(String),

    /// Not enough history to build the holdout window
    #[error("Insufficient history: need at least {needed} rows, got {got}")]
    InsufficientHistoryError { needed: usize, got: usize },

    /// Out-of-range parameters at the request boundary
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An inference feature fell into a data gap under the fail-fast policy
    #[error("Missing features at {timestamp}: {}", .features.join(", "))]
    MissingFeatureError {
        timestamp: DateTime<Utc>,
        features: Vec<String>,
    },

    /// Error raised by the regression capability
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON (de)serialization of artifacts
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from the numeric helpers
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),
}

/// Coarse classification of a [`ForecastError`]
///
/// A serving layer maps these onto its own responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingData,
    InsufficientHistory,
    Validation,
    MissingFeature,
    Model,
    Internal,
}

impl ForecastError {
    /// The kind of failure, preserved across layers
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::MissingDataError(_) => ErrorKind::MissingData,
            ForecastError::InsufficientHistoryError { .. } => ErrorKind::InsufficientHistory,
            ForecastError::ValidationError(_) | ForecastError::InvalidParameter(_) => {
                ErrorKind::Validation
            }
            ForecastError::MissingFeatureError { .. } => ErrorKind::MissingFeature,
            ForecastError::ModelError(_) => ErrorKind::Model,
            ForecastError::IoError(_)
            | ForecastError::PolarsError(_)
            | ForecastError::CsvError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::MathError(_) => ErrorKind::Internal,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}
