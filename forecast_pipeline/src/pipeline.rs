//! End-to-end training run
//!
//! Load, split, search, refit, persist. Nothing is written to the artifact
//! directory unless every earlier stage succeeded.

use crate::artifacts::{ArtifactStore, RunMetrics};
use crate::config::PipelineConfig;
use crate::data::{DataLoader, TimeSeriesData};
use crate::error::Result;
use crate::forecaster::refit_and_forecast;
use crate::models::arima::ArimaModel;
use crate::models::ForecastModel;
use crate::search::{grid_search, SearchOutcome};
use crate::split::train_test_split;
use crate::stationarity::{adf_test, StationarityReport};
use serde::Serialize;
use tracing::{info, warn};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Grid search result on the held-out window
    pub outcome: SearchOutcome,
    /// Metrics as persisted
    pub metrics: RunMetrics,
    /// Number of forecast days persisted
    pub forecast_len: usize,
    /// ADF result on the training split, when the check ran and succeeded
    pub stationarity: Option<StationarityReport>,
}

/// Training pipeline driven by a [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: PipelineConfig,
    store: ArtifactStore,
}

impl TrainingPipeline {
    /// Create a pipeline writing into `config.artifact_dir`
    pub fn new(config: PipelineConfig) -> Self {
        let store = ArtifactStore::new(&config.artifact_dir);
        Self { config, store }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Artifact store the run writes to
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Load the configured series and run with the ARIMA estimator
    pub fn run(&self) -> Result<TrainingReport> {
        self.config.validate()?;
        let model = ArimaModel::with_config(self.config.fit.clone())?;

        info!(path = %self.config.data_path.display(), "Loading data...");
        let series = match &self.config.value_column {
            Some(column) => DataLoader::from_csv_with_column(&self.config.data_path, column)?,
            None => DataLoader::from_csv(&self.config.data_path)?,
        };
        info!(rows = series.len(), "Loaded series");

        self.run_with(&model, &series)
    }

    /// Run on an already loaded series with any estimator
    pub fn run_with<M>(&self, model: &M, series: &TimeSeriesData) -> Result<TrainingReport>
    where
        M: ForecastModel,
        M::Trained: Serialize,
    {
        let (train, test) = train_test_split(series, self.config.test_window)?;
        info!(train = train.len(), test = test.len(), "Split series");

        let stationarity = if self.config.check_stationarity {
            self.log_stationarity(&train)
        } else {
            None
        };

        let outcome = grid_search(model, &train, &test, &self.config.grid.candidates())?;
        let best = outcome.best;

        let output = refit_and_forecast(model, series, best.order, self.config.horizon)?;

        let metrics = RunMetrics {
            best_order: best.order,
            rmse: best.rmse,
            test_data_size: test.len(),
        };
        self.store
            .write_run(&output.model, &metrics, &output.payload(series))?;

        info!(
            order = %best.order,
            rmse = best.rmse,
            horizon = output.values.len(),
            "Training complete"
        );

        Ok(TrainingReport {
            outcome,
            metrics,
            forecast_len: output.values.len(),
            stationarity,
        })
    }

    fn log_stationarity(&self, train: &TimeSeriesData) -> Option<StationarityReport> {
        match adf_test(train.values(), None) {
            Ok(report) => {
                info!(
                    statistic = report.statistic,
                    p_value = report.p_value,
                    lags = report.lags,
                    stationary = report.is_stationary(),
                    "ADF stationarity check"
                );
                Some(report)
            }
            Err(err) => {
                warn!("Stationarity check failed: {}", err);
                None
            }
        }
    }
}
