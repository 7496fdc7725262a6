//! Daily OHLC bar representation and input validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StockSignalError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// Bar with open/high/low all pinned to `close`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
        }
    }
}

/// Rejects sequences whose dates are not strictly ascending.
///
/// Duplicates count as an ordering violation. An empty sequence is valid.
pub fn validate_bars(ticker: &str, bars: &[OhlcBar]) -> Result<(), StockSignalError> {
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(StockSignalError::InvalidInputOrder {
                ticker: ticker.to_string(),
                index: i + 1,
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChange {
    pub previous_close: f64,
    pub latest_close: f64,
    pub change: f64,
    pub percent: f64,
}

/// Change between the last two closes, or `None` with fewer than two bars.
pub fn daily_change(bars: &[OhlcBar]) -> Option<DailyChange> {
    let [.., prev, last] = bars else {
        return None;
    };
    let change = last.close - prev.close;
    let percent = if prev.close != 0.0 {
        change / prev.close * 100.0
    } else {
        0.0
    };
    Some(DailyChange {
        previous_close: prev.close,
        latest_close: last.close,
        change,
        percent,
    })
}
