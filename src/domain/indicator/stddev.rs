//! Trailing-window statistics over closing prices.
//!
//! Population standard deviation over n closes:
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)

use crate::domain::ohlcv::OhlcBar;

/// Arithmetic mean of `close` over the window. Zero for an empty window.
pub fn mean_close(window: &[OhlcBar]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64
}

/// Population standard deviation (divides by N, not N-1) around `mean`.
pub fn population_stddev(window: &[OhlcBar], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let variance: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;

    variance.sqrt()
}
