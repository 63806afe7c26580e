//! Final refit and future projection

use crate::artifacts::ForecastPayload;
use crate::data::{TimeSeriesData, DATE_FORMAT};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelOrder, TrainedForecastModel};
use chrono::{Days, NaiveDate};
use tracing::info;

/// Default forecast horizon, in days
pub const DEFAULT_HORIZON: usize = 730;

/// Refitted model and its projection
#[derive(Debug, Clone)]
pub struct ForecastOutput<T> {
    /// Model refitted on the full series
    pub model: T,
    /// Consecutive days following the last historical date
    pub dates: Vec<NaiveDate>,
    /// Forecast values aligned with `dates`
    pub values: Vec<f64>,
}

impl<T> ForecastOutput<T> {
    /// Build the serving payload from the history and this forecast
    pub fn payload(&self, history: &TimeSeriesData) -> ForecastPayload {
        ForecastPayload {
            history_dates: history.date_strings(),
            history_values: history.values().to_vec(),
            forecast_dates: self
                .dates
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
            forecast_values: self.values.clone(),
        }
    }
}

/// `horizon` consecutive days starting the day after `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon)
        .map(|offset| {
            last.checked_add_days(Days::new(offset as u64)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Forecast horizon {} overflows the calendar",
                    horizon
                ))
            })
        })
        .collect()
}

/// Refit `order` on the whole series and forecast `horizon` days ahead.
///
/// Any failure of the refit is a [`ForecastError::FitFailure`]; no other
/// order is tried.
pub fn refit_and_forecast<M: ForecastModel>(
    model: &M,
    data: &TimeSeriesData,
    order: ModelOrder,
    horizon: usize,
) -> Result<ForecastOutput<M::Trained>> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be positive".to_string(),
        ));
    }
    let last = data.last_date().ok_or(ForecastError::InsufficientData {
        required: 1,
        actual: 0,
    })?;

    info!("Training final model with order {} on {} rows", order, data.len());

    let fit_failure = |err: ForecastError| ForecastError::FitFailure {
        order,
        reason: err.to_string(),
    };
    let trained = model.train(order, data).map_err(fit_failure)?;
    let forecast = trained.forecast(horizon).map_err(fit_failure)?;
    if !forecast.is_finite() {
        return Err(ForecastError::FitFailure {
            order,
            reason: "forecast contains non-finite values".to_string(),
        });
    }

    Ok(ForecastOutput {
        model: trained,
        dates: future_dates(last, horizon)?,
        values: forecast.into_values(),
    })
}
