//! Exponential moving average over a window of `k` samples.
//!
//! Weights are 2/(rank+1) for rank 1..=k, rank 1 being the most recent sample,
//! so the newest value weighs 1 and the oldest 2/(k+1). The weighted sum is
//! normalized by the sum of weights.
//! Warmup: first (k-1) points are undefined.

use super::rolling;
use crate::domain::series::TimeSeries;

pub fn exponential_moving_average(data: &TimeSeries, k: usize) -> TimeSeries {
    data.aligned(data.name.clone(), rolling(&data.values, k, weighted_mean))
}

fn weighted_mean(window: &[f64]) -> f64 {
    let size = window.len();
    let mut sum = 0.0;
    let mut weights = 0.0;
    for (i, value) in window.iter().enumerate() {
        // oldest first: rank runs from `size` down to 1
        let rank = (size - i) as f64;
        let weight = 2.0 / (rank + 1.0);
        sum += value * weight;
        weights += weight;
    }
    sum / weights
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
    fn ema_warmup() {
        let series = exponential_moving_average(&make_series(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(series.values[0], None);
        assert_eq!(series.values[1], None);
        assert!(series.values[2].is_some());
        assert!(series.values[3].is_some());
    }

    #[test]
    fn ema_known_weights() {
        let series = exponential_moving_average(&make_series(&[1.0, 2.0, 3.0]), 3);
        // weights oldest→newest: 2/4, 2/3, 2/2
        let weights = [0.5, 2.0 / 3.0, 1.0];
        let expected = (1.0 * weights[0] + 2.0 * weights[1] + 3.0 * weights[2])
            / weights.iter().sum::<f64>();
        assert_relative_eq!(series.values[2].unwrap(), expected);
    }

    #[test]
    fn ema_favours_recent_values() {
        let series = exponential_moving_average(&make_series(&[1.0, 2.0, 3.0]), 3);
        assert!(series.values[2].unwrap() > 2.0);
    }

    #[test]
    fn ema_constant_input() {
        let series = exponential_moving_average(&make_series(&[5.0; 6]), 4);
        for v in series.values.iter().skip(3) {
            assert_relative_eq!(v.unwrap(), 5.0);
        }
    }
}
