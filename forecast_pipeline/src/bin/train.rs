//! Train on the configured series and persist the artifacts.
//!
//! Settings come from `FORECAST_*` environment variables or a `.env` file.

use forecast_pipeline::config::PipelineConfig;
use forecast_pipeline::pipeline::TrainingPipeline;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match TrainingPipeline::new(config).run() {
        Ok(report) => {
            for skipped in &report.outcome.skipped {
                info!("Skipped {}: {}", skipped.order, skipped.reason);
            }
            info!(
                "Best model {} with RMSE {:.3} on {} held-out days",
                report.metrics.best_order, report.metrics.rmse, report.metrics.test_data_size
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Training failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
