//! Standard deviation indicator.
//!
//! Population standard deviation over the trailing `k` samples.
//! STD(k)[i] = sqrt(sum((X[i-j] - MA(k)[i])^2 for j in 0..k) / k)
//! Warmup: first (k-1) points are undefined.

use super::{mean, rolling};
use crate::domain::series::TimeSeries;

pub fn standard_deviation(data: &TimeSeries, k: usize) -> TimeSeries {
    data.aligned(data.name.clone(), rolling(&data.values, k, population_std))
}

fn population_std(window: &[f64]) -> f64 {
    let avg = mean(window);
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - avg;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> TimeSeries {
        TimeSeries::from_parts(
            "ask",
            (0..prices.len())
                .map(|i| {
                    NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, i as u32, 0)
                        .unwrap()
                })
                .collect(),
            prices.iter().map(|p| Some(*p)).collect(),
        )
    }

    #[test]
    fn stddev_warmup() {
        let series = standard_deviation(&make_series(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert_eq!(series.values[0], None);
        assert_eq!(series.values[1], None);
        assert!(series.values[2].is_some());
        assert!(series.values[4].is_some());
    }

    #[test]
    fn stddev_constant_values() {
        let series = standard_deviation(&make_series(&[100.0; 5]), 3);
        assert_relative_eq!(series.values[2].unwrap(), 0.0);
    }

    #[test]
    fn stddev_known_values() {
        let series =
            standard_deviation(&make_series(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        assert_relative_eq!(series.values[7].unwrap(), 2.0, epsilon = 1e-10);
    }
}
