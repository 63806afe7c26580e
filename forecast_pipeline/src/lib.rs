//! # Forecast Pipeline
//!
//! ARIMA model selection and forecasting for daily series, with file-backed
//! artifacts for a serving layer to read.
//!
//! ## Features
//!
//! - Daily series loading from CSV with gap and duplicate detection
//! - Train/test splitting on a trailing held-out window
//! - Grid search over ARIMA orders scored by held-out RMSE
//! - Final refit on the full series and multi-day forecasts
//! - Atomic artifact persistence (model, metrics, forecast)
//! - ADF stationarity report and a synthetic passenger series generator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_pipeline::config::PipelineConfig;
//! use forecast_pipeline::pipeline::TrainingPipeline;
//!
//! let config = PipelineConfig::from_env()?;
//! let report = TrainingPipeline::new(config).run()?;
//! println!("best {} rmse {:.3}", report.metrics.best_order, report.metrics.rmse);
//! # Ok::<(), forecast_pipeline::ForecastError>(())
//! ```

pub mod artifacts;
pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod split;
pub mod stationarity;
pub mod synthetic;

// Re-export commonly used types
pub use crate::artifacts::{ArtifactSlot, ArtifactStore, ForecastPayload, RunMetrics};
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, TimeSeriesData};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{refit_and_forecast, ForecastOutput};
pub use crate::models::arima::{ArimaModel, TrainedArimaModel};
pub use crate::models::{ForecastModel, ForecastResult, ModelOrder, TrainedForecastModel};
pub use crate::pipeline::{TrainingPipeline, TrainingReport};
pub use crate::search::{grid_search, CandidateGrid, EvaluationResult, SearchOutcome};
pub use crate::split::train_test_split;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
