//! RSI (Relative Strength Index) indicator.
//!
//! Over each trailing window of `k` samples, the k-1 step deltas are split
//! into gains and losses, each averaged over the number of deltas:
//! RSI = 100 * avg_gain / (avg_gain - avg_loss), with avg_loss <= 0.
//! If there are no losses (or no movement at all) RSI = 100.
//! Warmup: first (k-1) points are undefined.

use super::rolling;
use crate::domain::series::TimeSeries;

pub fn rsi(data: &TimeSeries, k: usize) -> TimeSeries {
    data.aligned(data.name.clone(), rolling(&data.values, k, strength_index))
}

fn strength_index(window: &[f64]) -> f64 {
    let deltas = window.len().saturating_sub(1);
    if deltas == 0 {
        return 100.0;
    }
    let mut gains = 0.0;
    let mut losses = 0.0;
    let mut has_loss = false;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else if change < 0.0 {
            losses += change;
            has_loss = true;
        }
    }
    let avg_gain = gains / deltas as f64;
    let avg_loss = losses / deltas as f64;
    let spread = avg_gain - avg_loss;
    if !has_loss || spread == 0.0 {
        return 100.0;
    }
    100.0 * avg_gain / spread
}
