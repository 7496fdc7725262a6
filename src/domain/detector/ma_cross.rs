//! Moving-average crossover detector (golden / death cross).
//!
//! Fast and slow SMAs are compared on the same bar date. A bar is evaluated
//! only when both averages exist on it and on the preceding bar, so the first
//! candidate is bar index `slow` (the `slow + 1`-th bar).

use tracing::debug;

use super::{Cross, SignalDetector, crossover};
use crate::domain::error::StockSignalError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{OhlcBar, validate_bars};
use crate::domain::signal::{PositionMachine, Signal, SignalKind, SignalSource};

#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossDetector {
    pub fast: usize,
    pub slow: usize,
}

impl Default for MaCrossDetector {
    fn default() -> Self {
        Self { fast: 20, slow: 60 }
    }
}

impl MaCrossDetector {
    pub fn signals_from(
        &self,
        bars: &[OhlcBar],
        fast: &IndicatorSeries,
        slow: &IndicatorSeries,
    ) -> Vec<Signal> {
        let mut machine = PositionMachine::new();
        let mut signals = Vec::new();

        for pair in bars.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let (Some(prev_fast), Some(prev_slow), Some(cur_fast), Some(cur_slow)) = (
                fast.simple(prev.date),
                slow.simple(prev.date),
                fast.simple(cur.date),
                slow.simple(cur.date),
            ) else {
                continue;
            };

            let cross = crossover(prev_fast, prev_slow, cur_fast, cur_slow);
            let enter = cross == Some(Cross::Above);
            let exit = cross == Some(Cross::Below);

            if let Some(kind) = machine.step(enter, exit) {
                let label = match kind {
                    SignalKind::Buy => "golden cross",
                    SignalKind::Sell => "death cross",
                };
                signals.push(Signal {
                    date: cur.date,
                    kind,
                    price: cur.close,
                    source: SignalSource::MaCross,
                    annotation: format!(
                        "{}: {} {:.2} vs {} {:.2}",
                        label, fast.indicator_type, cur_fast, slow.indicator_type, cur_slow
                    ),
                });
            }
        }

        signals
    }
}

impl SignalDetector for MaCrossDetector {
    fn source(&self) -> SignalSource {
        SignalSource::MaCross
    }

    fn detect(&self, ticker: &str, bars: &[OhlcBar]) -> Result<Vec<Signal>, StockSignalError> {
        validate_bars(ticker, bars)?;
        let fast = calculate_sma(bars, self.fast);
        let slow = calculate_sma(bars, self.slow);
        let signals = self.signals_from(bars, &fast, &slow);
        debug!(ticker, signals = signals.len(), "ma cross detector finished");
        Ok(signals)
    }
}
