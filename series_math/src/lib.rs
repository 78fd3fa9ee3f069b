//! # Series Math
//!
//! Numeric building blocks for hourly series forecasting.
//! This crate has no notion of timestamps; it works on plain windows of
//! values where `None` marks an hour with no observation.

use thiserror::Error;

pub mod accuracy;
pub mod cyclical;
pub mod window;

pub use accuracy::{forecast_accuracy, mean_absolute_error, ForecastAccuracy};
pub use cyclical::encode;
pub use window::{window_mean, window_std};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InvalidInput("lengths differ".to_string());
        assert_eq!(err.to_string(), "Invalid input: lengths differ");
    }
}
