//! Forecast accuracy metrics

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Accuracy of a forecast against realised values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (zero actuals are skipped)
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

fn check_lengths(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(MathError::InvalidInput(format!(
            "Forecast and actual values must have the same non-zero length (got {} and {})",
            forecast.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Mean absolute error between a forecast and the realised values
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;
    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (a - f).abs())
        .sum();
    Ok(sum / forecast.len() as f64)
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    check_lengths(forecast, actual)?;

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let nonzero = actual.iter().filter(|a| **a != 0.0).count();
    let mape = if nonzero == 0 {
        0.0
    } else {
        actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
            .sum::<f64>()
            / nonzero as f64
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mae_matches_hand_computation() {
        let forecast = [105.0, 106.0, 107.0];
        let actual = [106.0, 107.0, 108.0];
        assert_relative_eq!(mean_absolute_error(&forecast, &actual).unwrap(), 1.0);
    }

    #[test]
    fn test_full_metrics() {
        let forecast = [10.0, 20.0];
        let actual = [12.0, 16.0];
        let acc = forecast_accuracy(&forecast, &actual).unwrap();
        assert_relative_eq!(acc.mae, 3.0);
        assert_relative_eq!(acc.mse, 10.0);
        assert_relative_eq!(acc.rmse, 10.0_f64.sqrt());
        // (2/12 + 4/16) / 2 * 100
        assert_relative_eq!(acc.mape, 20.833333333333336, epsilon = 1e-9);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let acc = forecast_accuracy(&[1.0, 5.0], &[0.0, 4.0]).unwrap();
        assert_relative_eq!(acc.mape, 25.0);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        assert!(mean_absolute_error(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }
}
