//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: the first (period-1) bars produce no point.

use crate::domain::indicator::stddev::{mean_close, population_stddev};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[OhlcBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    if period == 0 || bars.len() < period {
        return IndicatorSeries::empty(indicator_type);
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let values = bars
        .windows(period)
        .map(|window| {
            let middle = mean_close(window);
            let stddev = population_stddev(window, middle);
            IndicatorPoint {
                date: window[period - 1].date,
                value: IndicatorValue::Bollinger {
                    upper: middle + mult * stddev,
                    middle,
                    lower: middle - mult * stddev,
                },
            }
        })
        .collect();

    IndicatorSeries::new(indicator_type, values)
}
