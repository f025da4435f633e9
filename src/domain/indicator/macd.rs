//! MACD indicator.
//!
//! SPREAD[i] = (SHORT[i] - LONG[i]) / SHORT[i] * 100
//! MACD(k)[i] = mean of SPREAD over the trailing `k` samples.
//! Undefined until the long average has warmed up and k-1 more samples exist.

use super::{finite, mean, rolling};
use crate::domain::series::TimeSeries;

pub fn macd(short: &TimeSeries, long: &TimeSeries, k: usize) -> TimeSeries {
    let spread: Vec<Option<f64>> = (0..short.len())
        .map(|i| match (short.get(i), long.get(i)) {
            (Some(s), Some(l)) => finite((s - l) / s * 100.0),
            _ => None,
        })
        .collect();
    short.aligned(short.name.clone(), rolling(&spread, k, mean))
}
