//! Augmented Dickey-Fuller stationarity check
//!
//! Regresses the first difference on a constant, the lagged level and
//! lagged differences. The t-statistic of the lagged level is converted to
//! an approximate p-value with MacKinnon's (1994) response surface for the
//! constant-only case.

use crate::error::{ForecastError, Result};
use series_math::regression::ols;
use statrs::distribution::{ContinuousCDF, Normal};

// MacKinnon (1994) response surface, one regressor, constant only
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Asymptotic critical values (1%, 5%, 10%), constant only
pub const CRITICAL_VALUES: [(f64, f64); 3] = [(0.01, -3.43), (0.05, -2.86), (0.10, -2.57)];

const MIN_OBSERVATIONS: usize = 10;

/// Outcome of an ADF test
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityReport {
    /// ADF t-statistic of the lagged level
    pub statistic: f64,
    /// Approximate p-value
    pub p_value: f64,
    /// Lagged differences included in the regression
    pub lags: usize,
    /// Observations used in the regression
    pub observations: usize,
}

impl StationarityReport {
    /// Unit root rejected at the 5% level
    pub fn is_stationary(&self) -> bool {
        self.p_value < 0.05
    }
}

/// Schwert's rule `floor(12 * (n / 100)^(1/4))`
pub fn default_lags(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// Run the ADF test with `lags` lagged differences (default: Schwert's rule).
///
/// The lag count is capped so the regression keeps more observations than
/// regressors.
pub fn adf_test(values: &[f64], lags: Option<usize>) -> Result<StationarityReport> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: n,
        });
    }

    let cap = n.saturating_sub(4) / 2;
    let lags = lags.unwrap_or_else(|| default_lags(n)).min(cap);

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // diffs[j] = y[j+1] - y[j]; regress diffs[j] on y[j] and diffs[j-1..j-lags]
    let mut design = Vec::with_capacity(diffs.len() - lags);
    let mut response = Vec::with_capacity(diffs.len() - lags);
    for j in lags..diffs.len() {
        let mut row = Vec::with_capacity(lags + 2);
        row.push(1.0);
        row.push(values[j]);
        row.extend((1..=lags).map(|i| diffs[j - i]));
        design.push(row);
        response.push(diffs[j]);
    }

    let fit = ols(&design, &response)?;
    let statistic = fit.t_statistic(1).ok_or_else(|| {
        ForecastError::ModelError("ADF regression has zero variance".to_string())
    })?;

    Ok(StationarityReport {
        statistic,
        p_value: mackinnon_p_value(statistic)?,
        lags,
        observations: fit.observations,
    })
}

/// Approximate p-value of an ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);

    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::ModelError(e.to_string()))?;
    Ok(normal.cdf(z))
}
