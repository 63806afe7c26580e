//! Synthetic daily passenger counts
//!
//! Produces a long daily series with compound annual growth, a yearly
//! pattern taken from monthly airline seasonality, a weekly pattern and
//! Gaussian noise proportional to the trend.

use crate::data::{TimeSeriesData, DATE_FORMAT};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::path::Path;
use tracing::info;

/// Ratio of each month's mean to the overall mean in the classic monthly
/// airline passenger series, January first
pub const AIRLINE_MONTHLY_FACTORS: [f64; 12] = [
    0.8625, 0.8384, 0.9639, 0.9528, 0.9698, 1.1119, 1.2534, 1.2525, 1.0789, 0.9511, 0.8307,
    0.9341,
];

/// Settings for [`generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// First day of the series
    pub start: NaiveDate,
    /// Last day of the series, inclusive
    pub end: NaiveDate,
    /// Trend level on the first day
    pub base: f64,
    /// Compound annual growth rate
    pub annual_growth: f64,
    /// Noise standard deviation as a fraction of the trend
    pub noise_ratio: f64,
    /// Seasonal factor per calendar month, January first
    pub monthly_factors: [f64; 12],
    /// RNG seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1950, 1, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid calendar date"),
            base: 120.0,
            annual_growth: 0.06,
            noise_ratio: 0.05,
            monthly_factors: AIRLINE_MONTHLY_FACTORS,
            seed: None,
        }
    }
}

/// Weekly pattern: busier on Fridays and Sundays, quieter mid-week
pub fn weekday_factor(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Fri => 1.05,
        Weekday::Sun => 1.02,
        Weekday::Tue | Weekday::Wed => 0.95,
        _ => 1.0,
    }
}

/// Generate the synthetic series described by `config`
pub fn generate(config: &SyntheticConfig) -> Result<TimeSeriesData> {
    if config.end < config.start {
        return Err(ForecastError::InvalidParameter(format!(
            "End date {} is before start date {}",
            config.end.format(DATE_FORMAT),
            config.start.format(DATE_FORMAT)
        )));
    }
    if config.base <= 0.0 || config.noise_ratio < 0.0 {
        return Err(ForecastError::InvalidParameter(
            "Base must be positive and noise ratio non-negative".to_string(),
        ));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let dates: Vec<NaiveDate> = config
        .start
        .iter_days()
        .take_while(|d| *d <= config.end)
        .collect();
    info!("Generating {} data points...", dates.len());

    let mut values = Vec::with_capacity(dates.len());
    for (i, date) in dates.iter().enumerate() {
        let years = i as f64 / 365.25;
        let trend = config.base * (1.0 + config.annual_growth).powf(years);
        let seasonal = config.monthly_factors[date.month0() as usize];
        let weekly = weekday_factor(date.weekday());

        let noise = Normal::new(0.0, trend * config.noise_ratio)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?
            .sample(&mut rng);

        values.push((trend * seasonal * weekly + noise).trunc());
    }

    TimeSeriesData::new(dates, values)
}

/// Write a series as `date,value` CSV
pub fn write_csv<P: AsRef<Path>>(path: P, data: &TimeSeriesData) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["date", "value"])?;
    for (date, value) in data.date_strings().iter().zip(data.values()) {
        writer.write_record([date.as_str(), value.to_string().as_str()])?;
    }
    writer.flush()?;

    info!(
        rows = data.len(),
        path = %path.as_ref().display(),
        "wrote synthetic series"
    );
    Ok(())
}
