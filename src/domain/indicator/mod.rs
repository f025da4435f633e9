//! Indicator kernels.
//!
//! Pure functions deriving a `TimeSeries` from one or more input series. Every
//! output is aligned to the index of its primary input. Positions where a value
//! cannot be computed (warm-up, absent inputs, division by zero) are `None`;
//! kernels never treat an absent input as zero.
//!
//! - `derivative`: per-minute percent change
//! - `moving_average`, `exponential_moving_average`: rolling means
//! - `standard_deviation`: rolling population standard deviation
//! - `variation`: signed largest excursion inside a window
//! - `rsi`: relative strength index over a window
//! - `macd`: smoothed percent spread between two averages
//! - `bollinger`: position of a value inside its Bollinger band

pub mod bollinger;
pub mod derivative;
pub mod ema;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod stddev;
pub mod variation;

pub use bollinger::bollinger;
pub use derivative::derivative;
pub use ema::exponential_moving_average;
pub use macd::macd;
pub use moving_average::moving_average;
pub use rsi::rsi;
pub use stddev::standard_deviation;
pub use variation::variation;

/// Applies `f` over every trailing window of `k` samples.
///
/// Output is `None` for the first `k-1` positions, for `k == 0` or a window
/// longer than the history, and for any window containing an absent value.
pub(crate) fn rolling<F>(values: &[Option<f64>], k: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if k == 0 || k > values.len() {
        return out;
    }
    let mut window = Vec::with_capacity(k);
    for i in (k - 1)..values.len() {
        window.clear();
        window.extend(values[i + 1 - k..=i].iter().map_while(|v| *v));
        if window.len() == k {
            out[i] = finite(f(&window));
        }
    }
    out
}

/// Maps NaN and infinities to an absent value.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

pub(crate) fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}
