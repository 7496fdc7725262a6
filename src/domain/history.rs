//! Per-ticker price history and the unified multi-ticker calendar.

use crate::domain::error::StockSignalError;
use crate::domain::ohlcv::{OhlcBar, validate_bars};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub ticker: String,
    pub bars: Vec<OhlcBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceHistory {
    /// Builds a date-indexed history, rejecting unordered or duplicate bars.
    pub fn new(ticker: impl Into<String>, bars: Vec<OhlcBar>) -> Result<Self, StockSignalError> {
        let ticker = ticker.into();
        validate_bars(&ticker, &bars)?;
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Ok(Self {
            ticker,
            bars,
            date_index,
        })
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&OhlcBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.get_bar(date).map(|b| b.close)
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// Sorted union of every date present across `histories`, limited to
/// `[start, end]`.
pub fn build_unified_timeline(
    histories: &[&PriceHistory],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = histories
        .iter()
        .flat_map(|h| h.bars.iter().map(|bar| bar.date))
        .filter(|d| *d >= start && *d <= end)
        .collect();
    unique_dates.into_iter().collect()
}
