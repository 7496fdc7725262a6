//! Bollinger band-touch detector.
//!
//! Buy when the close drops below the lower band; sell when it rises above
//! the upper band. Only bars that have bands (after the warmup) are evaluated.

use tracing::debug;

use super::SignalDetector;
use crate::domain::error::StockSignalError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::bollinger::{
    DEFAULT_PERIOD, DEFAULT_STDDEV_MULT_X100, calculate_bollinger,
};
use crate::domain::ohlcv::{OhlcBar, validate_bars};
use crate::domain::signal::{PositionMachine, Signal, SignalKind, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerDetector {
    pub period: usize,
    pub stddev_mult_x100: u32,
}

impl Default for BollingerDetector {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            stddev_mult_x100: DEFAULT_STDDEV_MULT_X100,
        }
    }
}

impl BollingerDetector {
    pub fn signals_from(&self, bars: &[OhlcBar], bands: &IndicatorSeries) -> Vec<Signal> {
        let mut machine = PositionMachine::new();
        let mut signals = Vec::new();

        for bar in bars {
            let Some(b) = bands.bands(bar.date) else {
                continue;
            };
            let enter = bar.close < b.lower;
            let exit = bar.close > b.upper;

            if let Some(kind) = machine.step(enter, exit) {
                let annotation = match kind {
                    SignalKind::Buy => format!(
                        "close {:.2} below lower band {:.2} (upper {:.2})",
                        bar.close, b.lower, b.upper
                    ),
                    SignalKind::Sell => format!(
                        "close {:.2} above upper band {:.2} (lower {:.2})",
                        bar.close, b.upper, b.lower
                    ),
                };
                signals.push(Signal {
                    date: bar.date,
                    kind,
                    price: bar.close,
                    source: SignalSource::Bollinger,
                    annotation,
                });
            }
        }

        signals
    }
}

impl SignalDetector for BollingerDetector {
    fn source(&self) -> SignalSource {
        SignalSource::Bollinger
    }

    fn detect(&self, ticker: &str, bars: &[OhlcBar]) -> Result<Vec<Signal>, StockSignalError> {
        validate_bars(ticker, bars)?;
        let bands = calculate_bollinger(bars, self.period, self.stddev_mult_x100);
        let signals = self.signals_from(bars, &bands);
        debug!(ticker, signals = signals.len(), "bollinger detector finished");
        Ok(signals)
    }
}
