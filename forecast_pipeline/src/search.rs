//! Grid search over ARIMA orders
//!
//! Candidates are generated up front as a flat, ordered list (p outermost,
//! then d, then q). Each candidate is fitted on the training split and
//! scored by RMSE on the held-out split. The minimum RMSE wins; on equal
//! RMSE the candidate listed first wins.

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelOrder, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Value sets whose Cartesian product forms the candidate orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateGrid {
    /// AR orders to try
    pub p_values: Vec<usize>,
    /// Differencing orders to try
    pub d_values: Vec<usize>,
    /// MA orders to try
    pub q_values: Vec<usize>,
}

impl CandidateGrid {
    /// Create a grid from the three value sets
    pub fn new(p_values: Vec<usize>, d_values: Vec<usize>, q_values: Vec<usize>) -> Self {
        Self {
            p_values,
            d_values,
            q_values,
        }
    }

    /// All candidate orders in enumeration order: p, then d, then q
    pub fn candidates(&self) -> Vec<ModelOrder> {
        self.p_values
            .iter()
            .flat_map(|&p| {
                self.d_values.iter().flat_map(move |&d| {
                    self.q_values.iter().map(move |&q| ModelOrder::new(p, d, q))
                })
            })
            .collect()
    }

    /// Number of candidates in the grid
    pub fn len(&self) -> usize {
        self.p_values.len() * self.d_values.len() * self.q_values.len()
    }

    /// Whether the grid yields no candidates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CandidateGrid {
    /// `ARIMA(5,1,0)` and `ARIMA(5,1,1)`
    fn default() -> Self {
        Self::new(vec![5], vec![1], vec![0, 1])
    }
}

/// Held-out error of one candidate order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Candidate order
    pub order: ModelOrder,
    /// Root mean squared error on the held-out split
    pub rmse: f64,
}

/// A candidate that could not be scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Candidate order
    pub order: ModelOrder,
    /// Why fitting or forecasting failed
    pub reason: String,
}

/// Result of a grid search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Minimum-RMSE candidate
    pub best: EvaluationResult,
    /// Every scored candidate, in enumeration order
    pub evaluated: Vec<EvaluationResult>,
    /// Every failed candidate, in enumeration order
    pub skipped: Vec<SkippedCandidate>,
}

/// Fit `order` on `train`, forecast `test.len()` steps and score the forecast
pub fn evaluate_candidate<M: ForecastModel>(
    model: &M,
    order: ModelOrder,
    train: &TimeSeriesData,
    test: &TimeSeriesData,
) -> Result<EvaluationResult> {
    let trained = model.train(order, train)?;
    let forecast = trained.forecast(test.len())?;
    if !forecast.is_finite() {
        return Err(ForecastError::ModelError(format!(
            "{} produced non-finite forecasts",
            order
        )));
    }

    let accuracy = forecast.accuracy(test.values())?;
    if !accuracy.rmse.is_finite() {
        return Err(ForecastError::ModelError(format!(
            "{} produced a non-finite RMSE",
            order
        )));
    }
    debug!(%order, %accuracy, "candidate accuracy");

    Ok(EvaluationResult {
        order,
        rmse: accuracy.rmse,
    })
}

/// Evaluate every candidate and select the minimum-RMSE order.
///
/// Failed candidates are skipped and reported in the outcome. Fails with
/// [`ForecastError::NoViableModel`] when no candidate could be scored.
/// Errors for which [`ForecastError::is_fatal`] holds abort the search.
pub fn grid_search<M: ForecastModel>(
    model: &M,
    train: &TimeSeriesData,
    test: &TimeSeriesData,
    candidates: &[ModelOrder],
) -> Result<SearchOutcome> {
    info!(
        candidates = candidates.len(),
        train = train.len(),
        test = test.len(),
        model = model.name(),
        "starting grid search"
    );

    let mut best: Option<EvaluationResult> = None;
    let mut evaluated = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for &order in candidates {
        match evaluate_candidate(model, order, train, test) {
            Ok(result) => {
                info!("{} RMSE={:.3}", order, result.rmse);
                // Strict comparison keeps the earliest candidate on ties
                if best.map_or(true, |b| result.rmse < b.rmse) {
                    best = Some(result);
                }
                evaluated.push(result);
            }
            Err(err) if err.is_fatal() => {
                warn!("Aborting search at {}: {}", order, err);
                return Err(err);
            }
            Err(err) => {
                warn!("Error for {}: {}", order, err);
                skipped.push(SkippedCandidate {
                    order,
                    reason: err.to_string(),
                });
            }
        }
    }

    match best {
        Some(best) => {
            info!("Best {} RMSE={:.3}", best.order, best.rmse);
            Ok(SearchOutcome {
                best,
                evaluated,
                skipped,
            })
        }
        None => Err(ForecastError::NoViableModel { skipped }),
    }
}
