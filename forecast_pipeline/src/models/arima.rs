//! ARIMA models for time series forecasting
//!
//! Coefficients are estimated by conditional sum of squares (CSS) on the
//! differenced series, minimised with a bounded Nelder-Mead simplex. AR and
//! MA coefficients are kept inside `(-0.99, 0.99)`. A constant is only
//! estimated for `d == 0`; differenced models have none.

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, ModelOrder, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use series_math::differencing::{difference, integrate, integration_anchors};
use series_math::optimization::{nelder_mead, SimplexConfig};
use tracing::debug;

const COEFFICIENT_BOUND: f64 = 0.99;

/// Estimation settings for [`ArimaModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaFitConfig {
    /// Maximum simplex iterations per fit
    pub max_iter: usize,
    /// Convergence tolerance on the CSS objective
    pub tolerance: f64,
}

impl Default for ArimaFitConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
        }
    }
}

/// ARIMA estimator (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone, Default)]
pub struct ArimaModel {
    config: ArimaFitConfig,
}

/// Trained ARIMA model.
///
/// Keeps only the tail of the history needed to forecast, so the persisted
/// state stays small regardless of the training length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Fitted order
    order: ModelOrder,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Mean of the differenced series
    intercept: f64,
    /// Last `p` values of the differenced series
    differenced_tail: Vec<f64>,
    /// Last `q` in-sample residuals
    residual_tail: Vec<f64>,
    /// Last value at each differencing level, for integration
    anchors: Vec<f64>,
    /// In-sample residual variance
    residual_variance: f64,
    /// Akaike information criterion
    aic: f64,
    /// Bayesian information criterion
    bic: f64,
    /// Number of observations the model was fitted on
    observations: usize,
}

impl ArimaModel {
    /// Create a new ARIMA estimator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom settings
    pub fn with_config(config: ArimaFitConfig) -> Result<Self> {
        if config.max_iter == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_iter must be positive".to_string(),
            ));
        }
        if config.tolerance.is_nan() || config.tolerance <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "tolerance must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Estimation settings
    pub fn config(&self) -> &ArimaFitConfig {
        &self.config
    }

    /// Minimum number of observations an order can be fitted on
    pub fn min_observations(order: ModelOrder) -> usize {
        order.d + order.p.max(order.q) + 2
    }

    /// Estimate `(intercept, ar, ma)` on the differenced series.
    ///
    /// The intercept is pinned to zero when the order has no constant.
    fn estimate_parameters(
        &self,
        order: ModelOrder,
        series: &[f64],
    ) -> Result<(f64, Vec<f64>, Vec<f64>)> {
        let (p, q) = (order.p, order.q);
        let constant = order.has_constant();
        let mean = if constant {
            series.iter().sum::<f64>() / series.len() as f64
        } else {
            0.0
        };

        if p == 0 && q == 0 {
            return Ok((mean, Vec::new(), Vec::new()));
        }

        let mut initial = Vec::with_capacity(order.num_params());
        let mut bounds = Vec::with_capacity(order.num_params());
        if constant {
            initial.push(mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        initial.extend((0..p).map(|i| 0.1 / (i + 1) as f64));
        initial.extend((0..q).map(|i| 0.1 / (i + 1) as f64));
        bounds.extend(std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND)).take(p + q));

        // Coefficients follow the constant, if any
        let offset = usize::from(constant);
        let unpack = |params: &[f64]| -> (f64, Vec<f64>, Vec<f64>) {
            let intercept = if constant { params[0] } else { 0.0 };
            let coefficients = &params[offset..];
            (
                intercept,
                coefficients[..p].to_vec(),
                coefficients[p..].to_vec(),
            )
        };

        let simplex = SimplexConfig {
            max_iter: self.config.max_iter,
            tolerance: self.config.tolerance,
            ..SimplexConfig::default()
        };
        let result = nelder_mead(
            |params| {
                let (intercept, ar, ma) = unpack(params);
                conditional_residuals(series, intercept, &ar, &ma)
                    .iter()
                    .map(|e| e * e)
                    .sum()
            },
            &initial,
            Some(&bounds),
            &simplex,
        );

        if !result.value.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "{}: conditional sum of squares is not finite",
                order
            )));
        }
        debug!(
            %order,
            iterations = result.iterations,
            converged = result.converged,
            css = result.value,
            "estimated ARIMA coefficients"
        );

        Ok(unpack(&result.point))
    }
}

/// One-step-ahead residuals with pre-sample shocks set to zero.
///
/// Returned residuals start at index `max(p, q)` of `series`.
fn conditional_residuals(series: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let start = ar.len().max(ma.len());
    let mut residuals = vec![0.0; series.len()];

    for t in start..series.len() {
        let mut prediction = intercept;
        for (i, phi) in ar.iter().enumerate() {
            prediction += phi * (series[t - 1 - i] - intercept);
        }
        for (i, theta) in ma.iter().enumerate() {
            prediction += theta * residuals[t - 1 - i];
        }
        residuals[t] = series[t] - prediction;
    }

    residuals.split_off(start.min(series.len()))
}

fn tail(values: &[f64], n: usize) -> Vec<f64> {
    values[values.len().saturating_sub(n)..].to_vec()
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, order: ModelOrder, data: &TimeSeriesData) -> Result<TrainedArimaModel> {
        let values = data.values();
        let required = Self::min_observations(order);
        if values.len() < required {
            return Err(ForecastError::ModelError(format!(
                "Insufficient data for {}. Need at least {} observations, got {}.",
                order,
                required,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelError(
                "Series contains non-finite values".to_string(),
            ));
        }

        let differenced = difference(values, order.d);
        let (intercept, ar_coefficients, ma_coefficients) =
            self.estimate_parameters(order, &differenced)?;

        let residuals =
            conditional_residuals(&differenced, intercept, &ar_coefficients, &ma_coefficients);
        let n_eff = residuals.len() as f64;
        let residual_variance = residuals.iter().map(|r| r * r).sum::<f64>() / n_eff;
        if !residual_variance.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "{}: residual variance is not finite",
                order
            )));
        }

        // Gaussian log-likelihood of the CSS residuals
        let k = order.num_params() as f64;
        let log_likelihood = -0.5
            * n_eff
            * (1.0 + residual_variance.max(f64::MIN_POSITIVE).ln() + (2.0 * std::f64::consts::PI).ln());

        Ok(TrainedArimaModel {
            name: order.to_string(),
            order,
            differenced_tail: tail(&differenced, order.p),
            residual_tail: tail(&residuals, order.q),
            anchors: integration_anchors(values, order.d),
            ar_coefficients,
            ma_coefficients,
            intercept,
            residual_variance,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n_eff.ln(),
            observations: values.len(),
        })
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

impl TrainedArimaModel {
    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// In-sample residual variance
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Number of observations the model was fitted on
    pub fn observations(&self) -> usize {
        self.observations
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        let mut history = self.differenced_tail.clone();
        let mut shocks = self.residual_tail.clone();
        let mut forecasts = Vec::with_capacity(horizons);

        for _ in 0..horizons {
            let mut prediction = self.intercept;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if let Some(value) = history.len().checked_sub(i + 1).map(|idx| history[idx]) {
                    prediction += phi * (value - self.intercept);
                }
            }
            for (i, theta) in self.ma_coefficients.iter().enumerate() {
                if let Some(shock) = shocks.len().checked_sub(i + 1).map(|idx| shocks[idx]) {
                    prediction += theta * shock;
                }
            }

            history.push(prediction);
            // Future shocks are zero in expectation
            shocks.push(0.0);
            forecasts.push(prediction);
        }

        let values = integrate(&forecasts, &self.anchors);
        ForecastResult::new(values, horizons)
    }

    fn order(&self) -> ModelOrder {
        self.order
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> TimeSeriesData {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeSeriesData::from_values(start, values).unwrap()
    }

    #[test]
    fn test_differenced_model_has_no_drift() {
        let data = series(vec![10.0, 14.0, 11.0, 20.0, 18.0, 25.0]);
        let trained = ArimaModel::new()
            .train(ModelOrder::new(0, 1, 0), &data)
            .unwrap();

        assert_eq!(trained.intercept(), 0.0);
        // Random walk: the last observation carries forward
        assert_eq!(trained.forecast(3).unwrap().values(), &[25.0, 25.0, 25.0]);
    }

    #[test]
    fn test_differenced_ar_forecast_levels_off() {
        let data = series((0..120).map(|i| 10.0 + 2.0 * i as f64).collect());
        let trained = ArimaModel::new()
            .train(ModelOrder::new(1, 1, 0), &data)
            .unwrap();

        assert_eq!(trained.intercept(), 0.0);
        let forecast = trained.forecast(400).unwrap();
        let values = forecast.values();
        // Increments decay geometrically instead of following a fixed slope
        assert!(values[0] > 248.0);
        assert!(values[399] - values[398] < values[1] - values[0]);
        assert!(values[399] < 248.0 + 2.0 * 400.0);
    }

    #[test]
    fn test_undifferenced_model_estimates_constant() {
        let data = series(vec![4.0, 6.0, 5.0, 7.0, 3.0, 5.0]);
        let trained = ArimaModel::new()
            .train(ModelOrder::new(0, 0, 0), &data)
            .unwrap();

        assert_abs_diff_eq!(trained.intercept(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(trained.forecast(2).unwrap().values()[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ar1_recovers_coefficient() {
        // Deterministic AR(1)-like oscillation decaying towards 50
        let mut values = vec![80.0];
        for i in 1..300 {
            let prev: f64 = values[i - 1];
            let wiggle = if i % 2 == 0 { 1.0 } else { -1.0 };
            values.push(50.0 + 0.6 * (prev - 50.0) + wiggle);
        }
        let data = series(values);

        let trained = ArimaModel::new()
            .train(ModelOrder::new(1, 0, 0), &data)
            .unwrap();

        assert!(trained.ar_coefficients()[0].abs() < COEFFICIENT_BOUND + 1e-12);
        let forecast = trained.forecast(50).unwrap();
        assert!(forecast.is_finite());
        // Long horizon reverts towards the mean level
        assert!((forecast.values()[49] - 50.0).abs() < 5.0);
    }

    #[test]
    fn test_insufficient_data_is_a_model_error() {
        let data = series(vec![1.0, 2.0, 3.0]);
        let err = ArimaModel::new()
            .train(ModelOrder::new(5, 1, 0), &data)
            .unwrap_err();

        assert!(matches!(err, ForecastError::ModelError(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_trained_model_round_trips_through_json() {
        let data = series((0..60).map(|i| (i as f64 * 0.3).sin() * 10.0 + i as f64).collect());
        let trained = ArimaModel::new()
            .train(ModelOrder::new(2, 1, 1), &data)
            .unwrap();

        let json = serde_json::to_string(&trained).unwrap();
        let restored: TrainedArimaModel = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.order(), ModelOrder::new(2, 1, 1));
        assert_eq!(restored.forecast(10).unwrap(), trained.forecast(10).unwrap());
    }

    #[test]
    fn test_invalid_config() {
        let config = ArimaFitConfig {
            max_iter: 0,
            ..ArimaFitConfig::default()
        };
        assert!(ArimaModel::with_config(config).is_err());
    }
}
