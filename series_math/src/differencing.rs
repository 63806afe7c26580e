//! Differencing and integration of series
//!
//! ARIMA models work on the `d`-times differenced series and map forecasts
//! back to the original scale by cumulative summation.

/// Apply `d` rounds of first differencing.
///
/// Each round shortens the series by one value; a series that runs out of
/// values stays empty.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Last value of the series at every differencing level `0..d`.
///
/// `anchors[k]` is the last value of `difference(series, k)`, the starting
/// point for integrating a forecast back through level `k`.
pub fn integration_anchors(series: &[f64], d: usize) -> Vec<f64> {
    (0..d)
        .map(|level| {
            difference(series, level)
                .last()
                .copied()
                .unwrap_or(0.0)
        })
        .collect()
}

/// Undo `anchors.len()` rounds of differencing on a forecast.
///
/// The innermost level is integrated first, each level starting from its
/// anchor value.
pub fn integrate(differenced: &[f64], anchors: &[f64]) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for &anchor in anchors.iter().rev() {
        let mut level = anchor;
        result = result
            .iter()
            .map(|step| {
                level += step;
                level
            })
            .collect();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_difference_orders() {
        let series = [1.0, 4.0, 9.0, 16.0, 25.0];

        assert_eq!(difference(&series, 0), series.to_vec());
        assert_eq!(difference(&series, 1), vec![3.0, 5.0, 7.0, 9.0]);
        assert_eq!(difference(&series, 2), vec![2.0, 2.0, 2.0]);
        assert!(difference(&[1.0], 1).is_empty());
    }

    #[test]
    fn test_integrate_continues_the_series() {
        let series = [1.0, 4.0, 9.0, 16.0, 25.0];
        let anchors = integration_anchors(&series, 2);
        assert_eq!(anchors, vec![25.0, 9.0]);

        // Second differences of n^2 are constant, so integrating 2s yields 36, 49
        let restored = integrate(&[2.0, 2.0], &anchors);
        assert_relative_eq!(restored[0], 36.0);
        assert_relative_eq!(restored[1], 49.0);
    }

    #[test]
    fn test_integrate_without_differencing_is_identity() {
        assert_eq!(integrate(&[1.5, 2.5], &[]), vec![1.5, 2.5]);
    }
}
