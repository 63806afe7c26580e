use forecast_pipeline::forecaster::refit_and_forecast;
use forecast_pipeline::search::{grid_search, CandidateGrid};
use forecast_pipeline::split::train_test_split;
use forecast_pipeline::stationarity::adf_test;
use forecast_pipeline::synthetic::{generate, SyntheticConfig};
use forecast_pipeline::ArimaModel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Passenger Forecast: Basic ARIMA Example");
    println!("=======================================\n");

    // Three years of synthetic daily passengers
    let config = SyntheticConfig {
        start: chrono::NaiveDate::from_ymd_opt(2015, 1, 1).ok_or("invalid date")?,
        end: chrono::NaiveDate::from_ymd_opt(2017, 12, 31).ok_or("invalid date")?,
        seed: Some(42),
        ..SyntheticConfig::default()
    };
    let series = generate(&config)?;
    println!("Generated {} daily observations\n", series.len());

    let report = adf_test(series.values(), None)?;
    println!(
        "ADF statistic {:.3}, p-value {:.3} ({})\n",
        report.statistic,
        report.p_value,
        if report.is_stationary() { "stationary" } else { "unit root" }
    );

    let (train, test) = train_test_split(&series, 90)?;
    let grid = CandidateGrid::new(vec![1, 2, 5], vec![1], vec![0, 1]);

    println!("Evaluating {} candidate orders...", grid.len());
    let model = ArimaModel::new();
    let outcome = grid_search(&model, &train, &test, &grid.candidates())?;
    for result in &outcome.evaluated {
        println!("  {} RMSE {:.2}", result.order, result.rmse);
    }
    for skipped in &outcome.skipped {
        println!("  {} skipped: {}", skipped.order, skipped.reason);
    }
    println!("\nBest: {} (RMSE {:.2})\n", outcome.best.order, outcome.best.rmse);

    let forecast = refit_and_forecast(&model, &series, outcome.best.order, 14)?;
    println!("Two-week forecast:");
    for (date, value) in forecast.dates.iter().zip(&forecast.values) {
        println!("  {}: {:.0}", date, value);
    }

    Ok(())
}
