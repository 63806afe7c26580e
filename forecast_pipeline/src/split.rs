//! Train/test splitting of a daily series

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};

/// Default length of the held-out window, in days
pub const DEFAULT_TEST_WINDOW: usize = 365;

/// Split a series into a training prefix and the last `window` observations.
///
/// Order is preserved and the split is deterministic. The training part
/// must keep at least one observation, so the series needs `window + 1`
/// entries.
pub fn train_test_split(
    data: &TimeSeriesData,
    window: usize,
) -> Result<(TimeSeriesData, TimeSeriesData)> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "Test window must be positive".to_string(),
        ));
    }
    if data.len() <= window {
        return Err(ForecastError::InsufficientData {
            required: window + 1,
            actual: data.len(),
        });
    }

    let train_size = data.len() - window;
    let train = data.slice(0, Some(train_size))?;
    let test = data.slice(train_size, None)?;

    Ok((train, test))
}
