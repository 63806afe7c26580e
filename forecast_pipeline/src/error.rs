//! Error types for the forecast_pipeline crate

use crate::artifacts::ArtifactSlot;
use crate::models::ModelOrder;
use crate::search::SkippedCandidate;
use thiserror::Error;

/// Custom error types for the forecast_pipeline crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The source series could not be read or parsed
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The series is too short for the requested operation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Every grid candidate failed to fit or forecast
    #[error("No viable model: all {} candidates failed", .skipped.len())]
    NoViableModel { skipped: Vec<SkippedCandidate> },

    /// Refitting the selected order on the full series failed
    #[error("Fit failure for {order}: {reason}")]
    FitFailure { order: ModelOrder, reason: String },

    /// An artifact slot has never been written
    #[error("Artifact missing: {0}")]
    ArtifactMissing(ArtifactSlot),

    /// Numerical failure while fitting or forecasting a single model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to validation of computed values
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from configuration values
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialisation
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether the error aborts a grid search.
    ///
    /// Numerical and per-order failures only describe one candidate and are
    /// skipped by [`crate::search::grid_search`]. Everything else, I/O and
    /// serialisation included, propagates.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ForecastError::ModelError(_)
                | ForecastError::MathError(_)
                | ForecastError::InsufficientData { .. }
                | ForecastError::InvalidParameter(_)
                | ForecastError::ValidationError(_)
        )
    }
}
