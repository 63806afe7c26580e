//! Forecasting models for time series data

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use series_math::accuracy::{forecast_accuracy, root_mean_squared_error, ForecastAccuracy};
use std::fmt::{self, Debug};

/// ARIMA order `(p, d, q)`.
///
/// Serialised as the JSON array `[p, d, q]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct ModelOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ModelOrder {
    /// Create a new order
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Whether the model carries a constant term.
    ///
    /// Only undifferenced orders do; with `d >= 1` the differenced series
    /// is modelled around zero, so forecasts carry no drift.
    pub fn has_constant(&self) -> bool {
        self.d == 0
    }

    /// Number of estimated coefficients (AR + MA + constant, if any)
    pub fn num_params(&self) -> usize {
        self.p + self.q + usize::from(self.has_constant())
    }
}

impl From<[usize; 3]> for ModelOrder {
    fn from([p, d, q]: [usize; 3]) -> Self {
        Self { p, d, q }
    }
}

impl From<ModelOrder> for [usize; 3] {
    fn from(order: ModelOrder) -> Self {
        [order.p, order.d, order.q]
    }
}

impl From<(usize, usize, usize)> for ModelOrder {
    fn from((p, d, q): (usize, usize, usize)) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self { values, horizons })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Take ownership of the forecasted values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Whether every forecasted value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Root mean squared error between forecast and actual values
    pub fn root_mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        Ok(root_mean_squared_error(&self.values, actual)?)
    }

    /// Full set of accuracy metrics against actual values
    pub fn accuracy(&self, actual: &[f64]) -> Result<ForecastAccuracy> {
        Ok(forecast_accuracy(&self.values, actual)?)
    }
}

/// Trained forecast model.
///
/// This is the only capability the pipeline needs from a fitted model, so
/// the estimation algorithm behind it can change freely.
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Order the model was fitted with
    fn order(&self) -> ModelOrder;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on time series data
pub trait ForecastModel: Debug {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train a model of the given order on time series data
    fn train(&self, order: ModelOrder, data: &TimeSeriesData) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
