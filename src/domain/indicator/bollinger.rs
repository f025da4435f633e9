//! Bollinger band position.
//!
//! BOLL[i] = (X[i] - MEAN[i]) / (2 * k * STD[i])
//! Undefined wherever the standard deviation is zero or any input is absent.

use super::finite;
use crate::domain::series::TimeSeries;

pub fn bollinger(value: &TimeSeries, mean: &TimeSeries, std: &TimeSeries, k: f64) -> TimeSeries {
    let values = (0..value.len())
        .map(|i| match (value.get(i), mean.get(i), std.get(i)) {
            (Some(x), Some(m), Some(s)) if s != 0.0 => finite((x - m) / (2.0 * k * s)),
            _ => None,
        })
        .collect();
    value.aligned(value.name.clone(), values)
}
