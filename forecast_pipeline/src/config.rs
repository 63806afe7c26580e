//! Training configuration
//!
//! Defaults reproduce the stock run on the daily airline series. Every
//! field can be overridden from the environment (or a `.env` file).

use crate::error::{ForecastError, Result};
use crate::forecaster::DEFAULT_HORIZON;
use crate::models::arima::ArimaFitConfig;
use crate::search::CandidateGrid;
use crate::split::DEFAULT_TEST_WINDOW;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Default input series
pub const DEFAULT_DATA_PATH: &str = "data/airline-passengers-daily.csv";

/// Default artifact directory
pub const DEFAULT_ARTIFACT_DIR: &str = "model";

/// Settings of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV file holding the daily series
    pub data_path: PathBuf,
    /// Value column; detected when `None`
    pub value_column: Option<String>,
    /// Directory receiving the artifacts
    pub artifact_dir: PathBuf,
    /// Held-out window length, in days
    pub test_window: usize,
    /// Forecast horizon, in days
    pub horizon: usize,
    /// Candidate orders
    pub grid: CandidateGrid,
    /// Log an ADF stationarity report before searching
    pub check_stationarity: bool,
    /// Estimator tuning
    pub fit: ArimaFitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            value_column: None,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            test_window: DEFAULT_TEST_WINDOW,
            horizon: DEFAULT_HORIZON,
            grid: CandidateGrid::default(),
            check_stationarity: true,
            fit: ArimaFitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `FORECAST_*` variables, after loading `.env`
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("FORECAST_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(column) = lookup("FORECAST_VALUE_COLUMN") {
            let column = column.trim();
            config.value_column = (!column.is_empty()).then(|| column.to_string());
        }
        if let Some(dir) = lookup("FORECAST_ARTIFACT_DIR") {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("FORECAST_TEST_WINDOW") {
            config.test_window = parse_value("FORECAST_TEST_WINDOW", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_HORIZON") {
            config.horizon = parse_value("FORECAST_HORIZON", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_P_VALUES") {
            config.grid.p_values = parse_list("FORECAST_P_VALUES", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_D_VALUES") {
            config.grid.d_values = parse_list("FORECAST_D_VALUES", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_Q_VALUES") {
            config.grid.q_values = parse_list("FORECAST_Q_VALUES", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_CHECK_STATIONARITY") {
            config.check_stationarity = parse_value("FORECAST_CHECK_STATIONARITY", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could complete with
    pub fn validate(&self) -> Result<()> {
        if self.test_window == 0 {
            return Err(ForecastError::ConfigError(
                "test window must be positive".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::ConfigError(
                "forecast horizon must be positive".to_string(),
            ));
        }
        if self.grid.is_empty() {
            return Err(ForecastError::ConfigError(
                "candidate grid is empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ForecastError::ConfigError(format!("{}: cannot parse '{}'", key, raw)))
}

fn parse_list(key: &str, raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_value(key, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.test_window, 365);
        assert_eq!(config.horizon, 730);
        assert_eq!(config.grid.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("FORECAST_TEST_WINDOW", "30"),
            ("FORECAST_HORIZON", " 14 "),
            ("FORECAST_P_VALUES", "0, 1,2"),
            ("FORECAST_VALUE_COLUMN", "passengers"),
            ("FORECAST_CHECK_STATIONARITY", "false"),
        ]))
        .unwrap();

        assert_eq!(config.test_window, 30);
        assert_eq!(config.horizon, 14);
        assert_eq!(config.grid.p_values, vec![0, 1, 2]);
        assert_eq!(config.value_column.as_deref(), Some("passengers"));
        assert!(!config.check_stationarity);
    }

    #[test]
    fn test_unparsable_value_is_config_error() {
        let err = PipelineConfig::from_lookup(lookup(&[("FORECAST_HORIZON", "soon")])).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_empty_grid_and_zero_window() {
        let err = PipelineConfig::from_lookup(lookup(&[("FORECAST_Q_VALUES", "")])).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)));

        let config = PipelineConfig {
            test_window: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
