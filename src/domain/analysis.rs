//! Per-ticker analysis: indicators, detector signals and one backtest per
//! detector, bundled for the rendering layer.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::backtest::{BacktestConfig, BacktestResult, run_backtest};
use super::detector::{
    BollingerDetector, BreakoutDetector, BreakoutEvent, MaCrossDetector, RsiDetector,
};
use super::error::StockSignalError;
use super::indicator::IndicatorSeries;
use super::indicator::bollinger::calculate_bollinger;
use super::indicator::rsi::calculate_rsi;
use super::indicator::sma::{calculate_sma, calculate_sma_set};
use super::market::fetch_available;
use super::metrics::Metrics;
use super::ohlcv::{DailyChange, OhlcBar, daily_change, validate_bars};
use super::signal::{Signal, SignalSource};
use crate::ports::data_port::DataPort;

pub const DEFAULT_MA_PERIODS: [usize; 5] = [5, 20, 60, 120, 200];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub rsi: RsiDetector,
    pub bollinger: BollingerDetector,
    pub ma_cross: MaCrossDetector,
    pub breakout: BreakoutDetector,
    /// Moving averages computed for display.
    pub ma_periods: Vec<usize>,
    pub backtest: BacktestConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rsi: RsiDetector::default(),
            bollinger: BollingerDetector::default(),
            ma_cross: MaCrossDetector::default(),
            breakout: BreakoutDetector::default(),
            ma_periods: DEFAULT_MA_PERIODS.to_vec(),
            backtest: BacktestConfig::default(),
        }
    }
}

/// One detector's signals replayed through the backtester.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub source: SignalSource,
    pub signals: Vec<Signal>,
    pub backtest: BacktestResult,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub bars: Vec<OhlcBar>,
    pub daily_change: Option<DailyChange>,
    pub moving_averages: Vec<IndicatorSeries>,
    pub rsi: IndicatorSeries,
    pub bollinger: IndicatorSeries,
    pub breakouts: Vec<BreakoutEvent>,
    /// RSI, Bollinger and MA-cross, in that order.
    pub strategies: Vec<StrategyReport>,
}

impl TickerAnalysis {
    pub fn strategy(&self, source: SignalSource) -> Option<&StrategyReport> {
        self.strategies.iter().find(|s| s.source == source)
    }
}

pub fn analyze_ticker(
    ticker: &str,
    bars: Vec<OhlcBar>,
    config: &AnalysisConfig,
) -> Result<TickerAnalysis, StockSignalError> {
    validate_bars(ticker, &bars)?;

    let moving_averages = calculate_sma_set(&bars, &config.ma_periods);
    let rsi = calculate_rsi(&bars, config.rsi.period);
    let bollinger = calculate_bollinger(
        &bars,
        config.bollinger.period,
        config.bollinger.stddev_mult_x100,
    );
    let fast = calculate_sma(&bars, config.ma_cross.fast);
    let slow = calculate_sma(&bars, config.ma_cross.slow);
    let long_term = calculate_sma(&bars, config.breakout.period);

    let detected = [
        (SignalSource::Rsi, config.rsi.signals_from(&bars, &rsi)),
        (
            SignalSource::Bollinger,
            config.bollinger.signals_from(&bars, &bollinger),
        ),
        (
            SignalSource::MaCross,
            config.ma_cross.signals_from(&bars, &fast, &slow),
        ),
    ];

    let mut strategies = Vec::with_capacity(detected.len());
    for (source, signals) in detected {
        let backtest = run_backtest(ticker, &bars, &signals, &config.backtest)?;
        let metrics = Metrics::compute(&backtest.equity_curve, &backtest.trades);
        strategies.push(StrategyReport {
            source,
            signals,
            backtest,
            metrics,
        });
    }

    let breakouts = config.breakout.events_from(&bars, &long_term);

    info!(
        ticker,
        bars = bars.len(),
        signals = strategies.iter().map(|s| s.signals.len()).sum::<usize>(),
        breakouts = breakouts.len(),
        "analysis finished"
    );

    Ok(TickerAnalysis {
        ticker: ticker.to_string(),
        daily_change: daily_change(&bars),
        bars,
        moving_averages,
        rsi,
        bollinger,
        breakouts,
        strategies,
    })
}

/// Analyzes every favorite in parallel. Tickers that fail to fetch or
/// analyze are skipped with a warning; the rest keep the input order.
pub fn analyze_favorites<P: DataPort + Sync + ?Sized>(
    port: &P,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    config: &AnalysisConfig,
) -> Vec<TickerAnalysis> {
    let histories = fetch_available(port, tickers, start, end);
    let results: Vec<Option<TickerAnalysis>> = histories
        .into_par_iter()
        .map(|history| {
            let ticker = history.ticker;
            match analyze_ticker(&ticker, history.bars, config) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "skipping favorite");
                    None
                }
            }
        })
        .collect();
    results.into_iter().flatten().collect()
}
