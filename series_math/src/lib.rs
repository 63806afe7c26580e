//! # Series Math
//!
//! Numerical building blocks for univariate time series models.
//! This crate provides differencing and integration, a bounded Nelder-Mead
//! simplex optimiser, ordinary least squares and forecast error measures.

use thiserror::Error;

pub mod accuracy;
pub mod differencing;
pub mod optimization;
pub mod regression;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 3 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 3 points"
        );
    }
}
