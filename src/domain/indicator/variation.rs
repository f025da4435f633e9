//! Variation indicator.
//!
//! For each trailing window of `k` samples, the largest upward and downward
//! deviation of the later samples relative to the window's first sample, in
//! percent. The one with the larger magnitude is returned, keeping its sign.
//! Warmup: first (k-1) points are undefined.

use super::rolling;
use crate::domain::series::TimeSeries;

pub fn variation(data: &TimeSeries, k: usize) -> TimeSeries {
    data.aligned(data.name.clone(), rolling(&data.values, k, largest_excursion))
}

fn largest_excursion(window: &[f64]) -> f64 {
    let first = window[0];
    let rest = &window[1..];
    if rest.is_empty() {
        return 0.0;
    }
    let max = rest.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = rest.iter().copied().fold(f64::INFINITY, f64::min);
    let max_pct = (max - first) / first * 100.0;
    let min_pct = (min - first) / first * 100.0;
    if max_pct.abs() >= min_pct.abs() {
        max_pct
    } else {
        min_pct
    }
}
