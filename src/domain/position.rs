//! All-in/all-out position tracking for the single-asset backtest.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpenPosition {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenPosition {
    /// Ratio of `price` to the entry price (1.0 = unchanged).
    pub fn growth(&self, price: f64) -> f64 {
        price / self.entry_price
    }

    pub fn close(self, exit_date: NaiveDate, exit_price: f64) -> ClosedTrade {
        ClosedTrade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date,
            exit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
}

impl ClosedTrade {
    /// Percentage return of the round trip.
    pub fn return_pct(&self) -> f64 {
        (self.exit_price / self.entry_price - 1.0) * 100.0
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
