//! Forecast accuracy measures

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MAE={:.4} MSE={:.4} RMSE={:.4} MAPE={:.4}% SMAPE={:.4}%",
            self.mae, self.mse, self.rmse, self.mape, self.smape
        )
    }
}

fn check_lengths(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(MathError::InvalidInput(format!(
            "Forecast ({}) and actual ({}) values must have the same non-zero length",
            forecast.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Mean squared error between a forecast and the observed values
pub fn mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;

    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (a - f).powi(2))
        .sum();

    Ok(sum / forecast.len() as f64)
}

/// Root mean squared error between a forecast and the observed values
pub fn root_mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    mean_squared_error(forecast, actual).map(f64::sqrt)
}

/// Calculate all accuracy metrics for a forecast vs actual values
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

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(errors.iter())
        .filter(|&(&a, _)| a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&a, &e)| {
            (sum + e.abs() / a.abs() * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        0.0
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
        rmse: mse.sqrt(),
        mape,
        smape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse() {
        let rmse = root_mean_squared_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 5.0]).unwrap();
        assert_relative_eq!(rmse, (5.0f64 / 3.0).sqrt());
    }

    #[test]
    fn test_perfect_forecast() {
        let acc = forecast_accuracy(&[10.0, 20.0], &[10.0, 20.0]).unwrap();
        assert_eq!(acc.rmse, 0.0);
        assert_eq!(acc.mape, 0.0);
        assert_eq!(acc.smape, 0.0);
    }

    #[test]
    fn test_accuracy_metrics() {
        let acc = forecast_accuracy(&[110.0, 90.0], &[100.0, 100.0]).unwrap();
        assert_relative_eq!(acc.mae, 10.0);
        assert_relative_eq!(acc.mse, 100.0);
        assert_relative_eq!(acc.rmse, 10.0);
        assert_relative_eq!(acc.mape, 10.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(root_mean_squared_error(&[1.0], &[1.0, 2.0]).is_err());
        assert!(root_mean_squared_error(&[], &[]).is_err());
    }
}
