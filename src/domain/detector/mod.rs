//! Signal detectors: indicator series + raw bars -> ordered Buy/Sell events.
//!
//! Each detector owns a fresh [`PositionMachine`](crate::domain::signal::PositionMachine)
//! per call, so running a detector twice over the same bars yields the same
//! signals. Indicator values are always looked up by bar date.

pub mod bollinger;
pub mod breakout;
pub mod ma_cross;
pub mod rsi;

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::error::StockSignalError;
use crate::domain::ohlcv::OhlcBar;
use crate::domain::signal::{Signal, SignalSource};

pub use bollinger::BollingerDetector;
pub use breakout::{BreakoutDetector, BreakoutEvent};
pub use ma_cross::MaCrossDetector;
pub use rsi::RsiDetector;

/// A position-driving detector.
pub trait SignalDetector {
    fn source(&self) -> SignalSource;

    /// Validates `bars` and returns signals in date order.
    fn detect(&self, ticker: &str, bars: &[OhlcBar]) -> Result<Vec<Signal>, StockSignalError>;
}

/// Type of crossover event detected between two data series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Above,
    Below,
}

/// Determine if a crossover occurred between the previous and current values.
pub fn crossover(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Option<Cross> {
    if prev_fast <= prev_slow && fast > slow {
        Some(Cross::Above)
    } else if prev_fast >= prev_slow && fast < slow {
        Some(Cross::Below)
    } else {
        None
    }
}

pub(crate) fn close_index(bars: &[OhlcBar]) -> BTreeMap<NaiveDate, f64> {
    bars.iter().map(|b| (b.date, b.close)).collect()
}
