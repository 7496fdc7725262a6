//! Simple moving average of closing prices.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), defined for i >= n-1.
//! The first (n-1) bars produce no point.

use crate::domain::indicator::stddev::mean_close;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcBar;

pub fn calculate_sma(bars: &[OhlcBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return IndicatorSeries::empty(IndicatorType::Sma(period));
    }

    let values = bars
        .windows(period)
        .map(|window| IndicatorPoint {
            date: window[period - 1].date,
            value: IndicatorValue::Simple(mean_close(window)),
        })
        .collect();

    IndicatorSeries::new(IndicatorType::Sma(period), values)
}

/// Computes one SMA series per period, in the order given.
pub fn calculate_sma_set(bars: &[OhlcBar], periods: &[usize]) -> Vec<IndicatorSeries> {
    periods.iter().map(|&p| calculate_sma(bars, p)).collect()
}
