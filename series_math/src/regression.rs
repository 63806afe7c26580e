//! Ordinary least squares
//!
//! Solves the normal equations with Gauss-Jordan elimination.

use crate::{MathError, Result};

/// Fitted least squares regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient
    pub standard_errors: Vec<f64>,
    /// Residual variance with `n - k` degrees of freedom
    pub residual_variance: f64,
    /// Number of observations used
    pub observations: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `index`
    pub fn t_statistic(&self, index: usize) -> Option<f64> {
        let coefficient = self.coefficients.get(index)?;
        let se = self.standard_errors.get(index)?;
        if *se > 0.0 {
            Some(coefficient / se)
        } else {
            None
        }
    }
}

/// Regress `response` on the rows of `design`.
///
/// Every row of `design` holds the regressors of one observation and must
/// have the same width. Needs more observations than regressors.
pub fn ols(design: &[Vec<f64>], response: &[f64]) -> Result<OlsFit> {
    let n = design.len();
    if n != response.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            n,
            response.len()
        )));
    }
    let k = design.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput("Design has no columns".to_string()));
    }
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations for {} regressors, got {}",
            k, k, n
        )));
    }
    if design.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design rows have different widths".to_string(),
        ));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in design.iter().zip(response.iter()) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let inverse = invert(xtx)?;
    let coefficients: Vec<f64> = inverse
        .iter()
        .map(|row| row.iter().zip(xty.iter()).map(|(a, b)| a * b).sum())
        .collect();

    let sse: f64 = design
        .iter()
        .zip(response.iter())
        .map(|(row, &y)| {
            let fitted: f64 = row.iter().zip(coefficients.iter()).map(|(x, b)| x * b).sum();
            (y - fitted).powi(2)
        })
        .sum();
    let residual_variance = sse / (n - k) as f64;

    let standard_errors = (0..k)
        .map(|i| (residual_variance * inverse[i][i]).max(0.0).sqrt())
        .collect();

    Ok(OlsFit {
        coefficients,
        standard_errors,
        residual_variance,
        observations: n,
    })
}

/// Invert a square matrix with partial pivoting
fn invert(mut matrix: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let k = matrix.len();
    let mut inverse: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&a, &b| {
                matrix[a][col]
                    .abs()
                    .partial_cmp(&matrix[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if matrix[pivot][col].abs() < 1e-12 * scale || !matrix[pivot][col].is_finite() {
            return Err(MathError::CalculationError(
                "Singular design matrix".to_string(),
            ));
        }

        matrix.swap(col, pivot);
        inverse.swap(col, pivot);

        let p = matrix[col][col];
        for j in 0..k {
            matrix[col][j] /= p;
            inverse[col][j] /= p;
        }

        for row in 0..k {
            if row != col {
                let factor = matrix[row][col];
                if factor != 0.0 {
                    for j in 0..k {
                        matrix[row][j] -= factor * matrix[col][j];
                        inverse[row][j] -= factor * inverse[col][j];
                    }
                }
            }
        }
    }

    Ok(inverse)
}
