//! RSI (Relative Strength Index) indicator.
//!
//! Average gain/loss are running smoothed averages seeded at zero before the
//! first bar, not Wilder averages seeded from the first n changes:
//! - avg = (prev_avg * (n-1) + current) / n, starting from prev_avg = 0
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both are 0 (no price movement yet): no point is emitted for that bar.
//!
//! The first bar never produces a point.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let n = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut values = Vec::with_capacity(bars.len() - 1);

    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;

        if let Some(rsi) = rsi_from_averages(avg_gain, avg_loss) {
            values.push(IndicatorPoint {
                date: pair[1].date,
                value: IndicatorValue::Simple(rsi),
            });
        }
    }

    IndicatorSeries::new(IndicatorType::Rsi(period), values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
