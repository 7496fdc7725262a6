//! Long-term moving-average breakout events.
//!
//! Informational only: records every bar whose close moves from at-or-below
//! the SMA to above it. Carries no position state and is never fed to a
//! backtest.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::domain::error::StockSignalError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{OhlcBar, validate_bars};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutEvent {
    pub date: NaiveDate,
    pub close: f64,
    pub moving_average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutDetector {
    pub period: usize,
}

impl Default for BreakoutDetector {
    fn default() -> Self {
        Self { period: 200 }
    }
}

impl BreakoutDetector {
    pub fn events_from(&self, bars: &[OhlcBar], sma: &IndicatorSeries) -> Vec<BreakoutEvent> {
        bars.windows(2)
            .filter_map(|pair| {
                let (prev, cur) = (&pair[0], &pair[1]);
                let prev_ma = sma.simple(prev.date)?;
                let cur_ma = sma.simple(cur.date)?;
                (prev.close <= prev_ma && cur.close > cur_ma).then_some(BreakoutEvent {
                    date: cur.date,
                    close: cur.close,
                    moving_average: cur_ma,
                })
            })
            .collect()
    }

    pub fn detect(
        &self,
        ticker: &str,
        bars: &[OhlcBar],
    ) -> Result<Vec<BreakoutEvent>, StockSignalError> {
        validate_bars(ticker, bars)?;
        let sma = calculate_sma(bars, self.period);
        let events = self.events_from(bars, &sma);
        debug!(ticker, events = events.len(), "breakout detector finished");
        Ok(events)
    }
}
