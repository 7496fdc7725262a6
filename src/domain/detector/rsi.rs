//! RSI threshold detector.
//!
//! Buy when RSI crosses up through the oversold level (prev <= 30, cur > 30).
//! Sell when RSI crosses down through the overbought level (prev >= 70, cur < 70).
//! "Previous" is the preceding point of the RSI series.

use tracing::debug;

use super::{Cross, SignalDetector, close_index, crossover};
use crate::domain::error::StockSignalError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::rsi::{DEFAULT_PERIOD, calculate_rsi};
use crate::domain::ohlcv::{OhlcBar, validate_bars};
use crate::domain::signal::{PositionMachine, Signal, SignalKind, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct RsiDetector {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiDetector {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiDetector {
    /// Signals from a precomputed RSI series over `bars`.
    pub fn signals_from(&self, bars: &[OhlcBar], rsi: &IndicatorSeries) -> Vec<Signal> {
        let closes = close_index(bars);
        let mut machine = PositionMachine::new();
        let mut signals = Vec::new();

        for pair in rsi.values.windows(2) {
            let (Some(prev), Some(cur)) = (pair[0].value.as_simple(), pair[1].value.as_simple())
            else {
                continue;
            };
            let date = pair[1].date;
            let Some(&price) = closes.get(&date) else {
                continue;
            };

            let enter =
                crossover(prev, self.oversold, cur, self.oversold) == Some(Cross::Above);
            let exit =
                crossover(prev, self.overbought, cur, self.overbought) == Some(Cross::Below);

            if let Some(kind) = machine.step(enter, exit) {
                let annotation = match kind {
                    SignalKind::Buy => format!(
                        "RSI crossed above {:.0} ({:.2} -> {:.2})",
                        self.oversold, prev, cur
                    ),
                    SignalKind::Sell => format!(
                        "RSI fell below {:.0} ({:.2} -> {:.2})",
                        self.overbought, prev, cur
                    ),
                };
                signals.push(Signal {
                    date,
                    kind,
                    price,
                    source: SignalSource::Rsi,
                    annotation,
                });
            }
        }

        signals
    }
}

impl SignalDetector for RsiDetector {
    fn source(&self) -> SignalSource {
        SignalSource::Rsi
    }

    fn detect(&self, ticker: &str, bars: &[OhlcBar]) -> Result<Vec<Signal>, StockSignalError> {
        validate_bars(ticker, bars)?;
        let rsi = calculate_rsi(bars, self.period);
        let signals = self.signals_from(bars, &rsi);
        debug!(ticker, signals = signals.len(), "rsi detector finished");
        Ok(signals)
    }
}
