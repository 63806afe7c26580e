use chrono::{Days, NaiveDate};
use forecast_pipeline::forecaster::{future_dates, refit_and_forecast};
use forecast_pipeline::{ArimaModel, ForecastError, ModelOrder, TimeSeriesData, TrainedForecastModel};
use rstest::{fixture, rstest};

#[fixture]
fn trend() -> TimeSeriesData {
    let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
    TimeSeriesData::from_values(start, (0..90).map(|i| 50.0 + 1.5 * i as f64).collect()).unwrap()
}

#[rstest]
#[case(1)]
#[case(31)]
#[case(730)]
fn test_forecast_dates_follow_history(trend: TimeSeriesData, #[case] horizon: usize) {
    let output = refit_and_forecast(&ArimaModel::new(), &trend, ModelOrder::new(1, 1, 0), horizon)
        .unwrap();

    assert_eq!(output.dates.len(), horizon);
    assert_eq!(output.values.len(), horizon);

    let last = trend.last_date().unwrap();
    assert_eq!(output.dates[0], last.checked_add_days(Days::new(1)).unwrap());
    for pair in output.dates.windows(2) {
        assert_eq!(pair[0].checked_add_days(Days::new(1)), Some(pair[1]));
    }

    let payload = output.payload(&trend);
    assert!(payload.validate().is_ok());
    assert_eq!(payload.history_values.len(), trend.len());
}

#[rstest]
fn test_refit_uses_selected_order(trend: TimeSeriesData) {
    let order = ModelOrder::new(0, 1, 0);
    let output = refit_and_forecast(&ArimaModel::new(), &trend, order, 3).unwrap();

    assert_eq!(output.model.order(), order);
    // Random walk without drift repeats the last value, 183.5
    assert!(output.values.iter().all(|v| (v - 183.5).abs() < 1e-9));
}

#[rstest]
fn test_refit_failure_is_fit_failure(trend: TimeSeriesData) {
    let short = trend.slice(0, Some(4)).unwrap();
    let order = ModelOrder::new(5, 1, 0);

    match refit_and_forecast(&ArimaModel::new(), &short, order, 10) {
        Err(ForecastError::FitFailure { order: failed, .. }) => assert_eq!(failed, order),
        other => panic!("expected FitFailure, got {:?}", other),
    }
}

#[rstest]
fn test_zero_horizon_rejected(trend: TimeSeriesData) {
    assert!(matches!(
        refit_and_forecast(&ArimaModel::new(), &trend, ModelOrder::new(0, 1, 0), 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_future_dates_span_leap_year() {
    let dates = future_dates(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), 366).unwrap();
    assert_eq!(dates.first(), NaiveDate::from_ymd_opt(2024, 1, 1).as_ref());
    assert_eq!(dates.last(), NaiveDate::from_ymd_opt(2024, 12, 31).as_ref());
}
