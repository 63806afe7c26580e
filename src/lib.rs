//! # Passenger Forecast
//!
//! Daily passenger forecasting with ARIMA: model selection, forecasting,
//! artifact persistence and an HTTP API over the latest run.
//!
//! ## Example
//!
//! ```no_run
//! use passenger_forecast_workspace::pipeline::{PipelineConfig, TrainingPipeline};
//!
//! let report = TrainingPipeline::new(PipelineConfig::default()).run()?;
//! assert!(report.metrics.rmse >= 0.0);
//! # Ok::<(), passenger_forecast_workspace::pipeline::ForecastError>(())
//! ```

/// Numerical building blocks
pub use series_math as math;

/// Training pipeline and artifact store
pub use forecast_pipeline as pipeline;

/// HTTP API
pub use forecast_server as server;
