//! Simple moving average over the trailing `k` samples.
//!
//! Warmup: first (k-1) points are undefined.

use super::{mean, rolling};
use crate::domain::series::TimeSeries;

pub fn moving_average(data: &TimeSeries, k: usize) -> TimeSeries {
    data.aligned(data.name.clone(), rolling(&data.values, k, mean))
}
