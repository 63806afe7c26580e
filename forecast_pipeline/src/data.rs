//! Daily time series data and CSV loading

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use std::path::Path;

/// Date format used for every date rendered as text
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily time series: one value per calendar day, no gaps
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesData {
    /// Strictly consecutive calendar days
    dates: Vec<NaiveDate>,
    /// Observations aligned with `dates`
    values: Vec<f64>,
}

/// Data loader for daily series stored as CSV
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a daily series from a CSV file, detecting the value column
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesData> {
        Self::load(path.as_ref(), None)
    }

    /// Load a daily series from a CSV file using the named value column
    pub fn from_csv_with_column<P: AsRef<Path>>(
        path: P,
        value_column: &str,
    ) -> Result<TimeSeriesData> {
        Self::load(path.as_ref(), Some(value_column))
    }

    fn load(path: &Path, value_column: Option<&str>) -> Result<TimeSeriesData> {
        let unavailable =
            |msg: String| ForecastError::DataUnavailable(format!("{}: {}", path.display(), msg));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| unavailable(e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| unavailable(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let date_idx = Self::detect_time_column(&headers).ok_or_else(|| {
            unavailable("No time column found in data".to_string())
        })?;
        let value_idx = Self::detect_value_column(&headers, date_idx, value_column)
            .ok_or_else(|| {
                unavailable(match value_column {
                    Some(name) => format!("Value column '{}' not found", name),
                    None => "No value column found in data".to_string(),
                })
            })?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| unavailable(e.to_string()))?;
            // Header is line 1
            let line = line + 2;

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| {
                unavailable(format!("line {}: unparsable date '{}'", line, raw_date))
            })?;

            let raw_value = record.get(value_idx).unwrap_or_default();
            let value: f64 = raw_value.parse().map_err(|_| {
                unavailable(format!("line {}: unparsable value '{}'", line, raw_value))
            })?;
            if !value.is_finite() {
                return Err(unavailable(format!(
                    "line {}: non-finite value '{}'",
                    line, raw_value
                )));
            }

            rows.push((date, value));
        }

        if rows.is_empty() {
            return Err(unavailable("No rows in data".to_string()));
        }

        rows.sort_by_key(|(date, _)| *date);
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();
        check_consecutive_days(&dates).map_err(unavailable)?;

        Ok(TimeSeriesData { dates, values })
    }

    /// Detect the time column among the headers
    fn detect_time_column(headers: &[String]) -> Option<usize> {
        headers.iter().position(|name| {
            let lower = name.to_lowercase();
            lower.contains("date") || lower.contains("time")
        })
    }

    /// Detect the value column: the requested name, then `value`, then the
    /// first column that is not the time column
    fn detect_value_column(
        headers: &[String],
        date_idx: usize,
        requested: Option<&str>,
    ) -> Option<usize> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|name| name.eq_ignore_ascii_case(wanted))
        };

        match requested {
            Some(name) => find(name),
            None => find("value").or_else(|| (0..headers.len()).find(|&i| i != date_idx)),
        }
    }
}

/// Parse `YYYY-MM-DD`, optionally followed by a time of day
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Check that sorted dates advance by exactly one day
fn check_consecutive_days(dates: &[NaiveDate]) -> std::result::Result<(), String> {
    for pair in dates.windows(2) {
        let expected = pair[0].checked_add_days(Days::new(1));
        if Some(pair[1]) != expected {
            return Err(if pair[1] == pair[0] {
                format!("duplicate date {}", pair[0].format(DATE_FORMAT))
            } else {
                format!(
                    "gap between {} and {}",
                    pair[0].format(DATE_FORMAT),
                    pair[1].format(DATE_FORMAT)
                )
            });
        }
    }
    Ok(())
}

impl TimeSeriesData {
    /// Create a series from dates and values.
    ///
    /// Dates must be consecutive calendar days and values finite.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ValidationError(
                "Series contains non-finite values".to_string(),
            ));
        }
        check_consecutive_days(&dates).map_err(ForecastError::ValidationError)?;

        Ok(Self { dates, values })
    }

    /// Create a series of consecutive days starting at `start`
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|i| {
                start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                    ForecastError::ValidationError("Date out of range".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(dates, values)
    }

    /// Dates of the observations
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dates rendered as `YYYY-MM-DD`
    pub fn date_strings(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect()
    }

    /// First observed date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Get a slice of the data from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.len());
        if start > end || end > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Slice {}..{} out of bounds for series of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(Self {
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Append `other`, which must start the day after this series ends
    pub fn concat(&self, other: &Self) -> Result<Self> {
        let mut dates = self.dates.clone();
        dates.extend_from_slice(&other.dates);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Self::new(dates, values)
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2023-01-05"), Some(day("2023-01-05")));
        assert_eq!(parse_date("2023-01-05 13:45:00"), Some(day("2023-01-05")));
        assert_eq!(parse_date("2023-01-05T13:45:00Z"), Some(day("2023-01-05")));
        assert_eq!(parse_date("05/01/2023"), None);
    }

    #[test]
    fn test_detect_columns() {
        let headers = vec!["Date".to_string(), "Passengers".to_string()];
        assert_eq!(DataLoader::detect_time_column(&headers), Some(0));
        assert_eq!(DataLoader::detect_value_column(&headers, 0, None), Some(1));
        assert_eq!(
            DataLoader::detect_value_column(&headers, 0, Some("passengers")),
            Some(1)
        );
        assert_eq!(DataLoader::detect_value_column(&headers, 0, Some("close")), None);
    }

    #[test]
    fn test_consecutive_days() {
        let ok = vec![day("2024-02-28"), day("2024-02-29"), day("2024-03-01")];
        assert!(check_consecutive_days(&ok).is_ok());

        let gap = vec![day("2024-02-28"), day("2024-03-01")];
        assert!(check_consecutive_days(&gap).unwrap_err().contains("gap"));

        let dup = vec![day("2024-02-28"), day("2024-02-28")];
        assert!(check_consecutive_days(&dup).unwrap_err().contains("duplicate"));
    }
}
