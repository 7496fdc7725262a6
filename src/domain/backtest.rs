//! Single-asset backtest: replays one detector's signals over a bar history.
//!
//! Capital is fully invested on a Buy and fully realized on a Sell. While a
//! position is open, equity is marked to market against the entry close.
//! The loop is strictly sequential: each bar depends on the running state.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::error::StockSignalError;
use super::ohlcv::{OhlcBar, validate_bars};
use super::portfolio::EquityPoint;
use super::position::{ClosedTrade, OpenPosition};
use super::signal::{Signal, SignalKind, SignalSource};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub source: Option<SignalSource>,
    pub initial_capital: f64,
    /// Last realized capital; an open position is not included.
    pub final_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
    pub open_position: Option<OpenPosition>,
}

impl BacktestResult {
    /// Equity on the last bar (mark-to-market if a position is open).
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.value)
            .unwrap_or(self.initial_capital)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct DaySignals {
    buy: bool,
    sell: bool,
}

/// Returns the common source of `signals`, rejecting lists that mix detectors.
fn single_source(signals: &[Signal]) -> Result<Option<SignalSource>, StockSignalError> {
    let Some(first) = signals.first() else {
        return Ok(None);
    };
    if let Some(other) = signals.iter().find(|s| s.source != first.source) {
        return Err(StockSignalError::MixedSignalSources {
            first: first.source.to_string(),
            second: other.source.to_string(),
        });
    }
    Ok(Some(first.source))
}

pub fn run_backtest(
    ticker: &str,
    bars: &[OhlcBar],
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestResult, StockSignalError> {
    validate_bars(ticker, bars)?;
    let source = single_source(signals)?;

    let mut by_date: BTreeMap<NaiveDate, DaySignals> = BTreeMap::new();
    for signal in signals {
        let entry = by_date.entry(signal.date).or_default();
        match signal.kind {
            SignalKind::Buy => entry.buy = true,
            SignalKind::Sell => entry.sell = true,
        }
    }

    let mut capital = config.initial_capital;
    let mut position: Option<OpenPosition> = None;
    let mut trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(bars.len());

    for bar in bars {
        let day = by_date.get(&bar.date).copied().unwrap_or_default();

        if position.is_none() && day.buy {
            position = Some(OpenPosition {
                entry_date: bar.date,
                entry_price: bar.close,
            });
        }

        if day.sell {
            if let Some(open) = position.take() {
                capital *= open.growth(bar.close);
                trades.push(open.close(bar.date, bar.close));
            }
        }

        let value = match &position {
            Some(open) => capital * open.growth(bar.close),
            None => capital,
        };
        equity_curve.push(EquityPoint {
            date: bar.date,
            value,
        });
    }

    debug!(
        ticker,
        bars = bars.len(),
        trades = trades.len(),
        final_capital = capital,
        "backtest finished"
    );

    Ok(BacktestResult {
        source,
        initial_capital: config.initial_capital,
        final_capital: capital,
        equity_curve,
        trades,
        open_position: position,
    })
}
