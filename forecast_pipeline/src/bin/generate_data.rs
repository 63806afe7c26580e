//! Write a synthetic daily passenger series to the configured data path.
//!
//! `FORECAST_SEED` fixes the random generator.

use forecast_pipeline::config::PipelineConfig;
use forecast_pipeline::synthetic::{generate, write_csv, SyntheticConfig};
use std::env;
use std::process::ExitCode;
use tracing::error;
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

    let seed = match env::var("FORECAST_SEED").ok().map(|s| s.trim().parse::<u64>()) {
        None => None,
        Some(Ok(seed)) => Some(seed),
        Some(Err(err)) => {
            error!("Invalid FORECAST_SEED: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let synthetic = SyntheticConfig {
        seed,
        ..SyntheticConfig::default()
    };

    let result = generate(&synthetic).and_then(|data| write_csv(&config.data_path, &data));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Generation failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
