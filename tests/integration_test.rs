//! Integration tests for the analysis and portfolio pipelines.
//!
//! Tests cover:
//! - Ticker analysis through a mock data port (signals, backtests, metrics)
//! - Favorites fan-out with partial failures
//! - Portfolio valuation and benchmark comparison with mixed currencies
//! - CSV adapter end-to-end over files on disk

mod common;

use approx::assert_relative_eq;
use common::*;
use std::fs;
use stocksignal::adapters::csv_adapter::CsvAdapter;
use stocksignal::cli::{
    PortfolioSettings, run_analysis_pipeline, run_favorites_pipeline, run_portfolio_pipeline,
};
use stocksignal::domain::analysis::{AnalysisConfig, analyze_ticker};
use stocksignal::domain::backtest::BacktestConfig;
use stocksignal::domain::detector::{
    BollingerDetector, BreakoutDetector, MaCrossDetector, RsiDetector,
};
use stocksignal::domain::error::StockSignalError;
use stocksignal::domain::portfolio::CurrencyPolicy;
use stocksignal::domain::portfolio_backtest::{DateRange, GapFill, PortfolioBacktestConfig};
use stocksignal::domain::signal::{SignalKind, SignalSource};

fn short_config() -> AnalysisConfig {
    AnalysisConfig {
        rsi: RsiDetector {
            period: 5,
            ..RsiDetector::default()
        },
        bollinger: BollingerDetector {
            period: 10,
            stddev_mult_x100: 100,
        },
        ma_cross: MaCrossDetector { fast: 3, slow: 8 },
        breakout: BreakoutDetector { period: 15 },
        ma_periods: vec![5, 10],
        backtest: BacktestConfig {
            initial_capital: 10_000.0,
        },
    }
}

mod analysis_pipeline {
    use super::*;

    fn port() -> MockDataPort {
        let closes = sine_closes(120, 100.0, 15.0, 30.0);
        MockDataPort::new().with_bars("AAPL", bars_from_closes("2024-01-01", &closes))
    }

    #[test]
    fn every_detector_fires_on_an_oscillating_series() {
        let analysis = run_analysis_pipeline(&port(), "AAPL", &short_config()).unwrap();

        for source in [SignalSource::Rsi, SignalSource::Bollinger, SignalSource::MaCross] {
            let report = analysis.strategy(source).unwrap();
            assert!(!report.signals.is_empty(), "{source} produced no signals");
            assert_eq!(report.backtest.equity_curve.len(), 120);
        }
        assert!(!analysis.breakouts.is_empty());
    }

    #[test]
    fn signals_alternate_starting_with_buy() {
        let analysis = run_analysis_pipeline(&port(), "AAPL", &short_config()).unwrap();

        for report in &analysis.strategies {
            let kinds: Vec<SignalKind> = report.signals.iter().map(|s| s.kind).collect();
            assert_eq!(kinds.first(), Some(&SignalKind::Buy));
            for pair in kinds.windows(2) {
                assert_ne!(pair[0], pair[1], "{} repeated a signal", report.source);
            }
            for pair in report.signals.windows(2) {
                assert!(pair[0].date < pair[1].date);
            }
        }
    }

    #[test]
    fn trade_ledger_matches_signal_pairs() {
        let analysis = run_analysis_pipeline(&port(), "AAPL", &short_config()).unwrap();

        for report in &analysis.strategies {
            let sells = report
                .signals
                .iter()
                .filter(|s| s.kind == SignalKind::Sell)
                .count();
            assert_eq!(report.backtest.trades.len(), sells);
            assert_eq!(report.metrics.total_trades, sells);
            let buys = report.signals.len() - sells;
            assert_eq!(report.backtest.open_position.is_some(), buys > sells);
        }
    }

    #[test]
    fn analysis_is_deterministic() {
        let first = run_analysis_pipeline(&port(), "AAPL", &short_config()).unwrap();
        let second = run_analysis_pipeline(&port(), "AAPL", &short_config()).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn ticker_without_bars_gives_empty_analysis() {
        let analysis = run_analysis_pipeline(&port(), "MSFT", &short_config()).unwrap();

        assert!(analysis.bars.is_empty());
        assert!(analysis.daily_change.is_none());
        assert!(analysis.rsi.is_empty());
        assert!(analysis.strategies.iter().all(|s| s.signals.is_empty()));
        assert!(
            analysis
                .strategies
                .iter()
                .all(|s| s.backtest.equity_curve.is_empty())
        );
    }

    #[test]
    fn provider_error_propagates() {
        let port = MockDataPort::new().with_error("AAPL", "timeout");
        let err = run_analysis_pipeline(&port, "AAPL", &short_config()).unwrap_err();
        assert!(matches!(err, StockSignalError::MarketData { reason } if reason == "timeout"));
    }

    #[test]
    fn out_of_order_provider_data_is_rejected() {
        let mut bars = generate_bars("2024-01-01", 10, 50.0);
        bars.swap(3, 4);
        let port = MockDataPort::new().with_bars("AAPL", bars);
        let err = run_analysis_pipeline(&port, "AAPL", &short_config()).unwrap_err();
        assert!(matches!(err, StockSignalError::InvalidInputOrder { index: 4, .. }));
    }

    #[test]
    fn short_history_has_indicators_but_no_signals() {
        let analysis =
            analyze_ticker("NEW", generate_bars("2024-01-01", 4, 10.0), &short_config()).unwrap();

        assert!(analysis.bollinger.is_empty());
        assert!(analysis.moving_averages.iter().all(|s| s.is_empty()));
        assert!(analysis.strategies.iter().all(|s| s.signals.is_empty()));
        assert!(
            analysis
                .strategies
                .iter()
                .all(|s| s.backtest.final_equity() == 10_000.0)
        );
    }
}

mod favorites_pipeline {
    use super::*;

    fn port() -> MockDataPort {
        MockDataPort::new()
            .with_bars("AAPL", generate_bars("2024-01-01", 30, 100.0))
            .with_bars("005930.KS", generate_bars("2024-01-01", 30, 70_000.0))
            .with_error("BROKEN", "upstream unavailable")
    }

    fn favorites(tickers: &[&str]) -> MockHoldings {
        MockHoldings {
            favorites: tickers.iter().map(|t| t.to_string()).collect(),
            ..MockHoldings::default()
        }
    }

    #[test]
    fn failing_tickers_are_skipped() {
        let analyses = run_favorites_pipeline(
            &port(),
            &favorites(&["AAPL", "BROKEN", "MISSING", "005930.KS"]),
            &short_config(),
        )
        .unwrap();

        // MISSING has no bars, which is empty data rather than a failure.
        let tickers: Vec<&str> = analyses.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "MISSING", "005930.KS"]);
        assert!(analyses[1].bars.is_empty());
        assert!(analyses[1].strategies.iter().all(|s| s.signals.is_empty()));
    }

    #[test]
    fn all_failing_is_no_data() {
        let err = run_favorites_pipeline(&port(), &favorites(&["BROKEN"]), &short_config())
            .unwrap_err();
        assert!(matches!(err, StockSignalError::NoData { .. }));
    }

    #[test]
    fn empty_favorites_is_empty_result() {
        let analyses =
            run_favorites_pipeline(&port(), &favorites(&[]), &short_config()).unwrap();
        assert!(analyses.is_empty());
    }
}

mod portfolio_pipeline {
    use super::*;

    fn settings(today: chrono::NaiveDate, gap_fill: GapFill) -> PortfolioSettings {
        PortfolioSettings {
            benchmark: "SPY".into(),
            backtest: PortfolioBacktestConfig {
                range: DateRange {
                    start: date(2024, 3, 1),
                    end: today,
                },
                today,
                currency: CurrencyPolicy {
                    exchange_rate: 1000.0,
                    ..CurrencyPolicy::default()
                },
                gap_fill,
            },
        }
    }

    fn port() -> MockDataPort {
        MockDataPort::new()
            .with_bars(
                "AAPL",
                vec![
                    make_bar("2024-03-01", 10.0),
                    make_bar("2024-03-04", 12.0),
                    make_bar("2024-03-05", 11.0),
                    make_bar("2024-03-06", 13.0),
                ],
            )
            .with_bars(
                "005930.KS",
                vec![
                    make_bar("2024-03-01", 50_000.0),
                    make_bar("2024-03-04", 51_000.0),
                    make_bar("2024-03-06", 52_000.0),
                ],
            )
            .with_bars(
                "SPY",
                vec![
                    make_bar("2024-03-01", 400.0),
                    make_bar("2024-03-04", 404.0),
                    make_bar("2024-03-05", 400.0),
                    make_bar("2024-03-06", 420.0),
                ],
            )
    }

    fn holdings() -> MockHoldings {
        MockHoldings {
            portfolio: vec![holding("AAPL", 2.0, 9.0), holding("005930.KS", 1.0, 40_000.0)],
            ..MockHoldings::default()
        }
    }

    #[test]
    fn valuation_uses_latest_prices_and_currency() {
        let (valuation, _) =
            run_portfolio_pipeline(&port(), &holdings(), &settings(date(2024, 3, 7), GapFill::CarryTotal))
                .unwrap();

        // AAPL 2 * 13 * 1000 + Samsung 52_000
        assert_relative_eq!(valuation.total_assets, 78_000.0, epsilon = 1e-6);
        // AAPL 2 * 9 * 1000 + Samsung 40_000
        assert_relative_eq!(valuation.total_investment, 58_000.0, epsilon = 1e-6);
    }

    #[test]
    fn carry_total_holds_value_on_gap_days() {
        let (_, backtest) =
            run_portfolio_pipeline(&port(), &holdings(), &settings(date(2024, 3, 7), GapFill::CarryTotal))
                .unwrap();

        let values: Vec<f64> = backtest.portfolio.iter().map(|p| p.value).collect();
        // 03-01: 20_000 + 50_000; 03-04: 24_000 + 51_000; 03-05: Samsung missing -> carry
        assert_eq!(values, vec![70_000.0, 75_000.0, 75_000.0, 78_000.0]);
    }

    #[test]
    fn per_asset_fill_tracks_present_holdings() {
        let (_, backtest) =
            run_portfolio_pipeline(&port(), &holdings(), &settings(date(2024, 3, 7), GapFill::PerAsset))
                .unwrap();

        assert_eq!(backtest.portfolio[2].value, 22_000.0 + 51_000.0);
    }

    #[test]
    fn benchmark_is_normalized_to_portfolio_start() {
        let (_, backtest) =
            run_portfolio_pipeline(&port(), &holdings(), &settings(date(2024, 3, 7), GapFill::CarryTotal))
                .unwrap();

        let bench: Vec<f64> = backtest.benchmark.iter().map(|p| p.value).collect();
        assert_eq!(bench[0], 70_000.0);
        assert_relative_eq!(bench[1], 70_700.0, epsilon = 1e-6);
        assert_relative_eq!(bench[3], 70_000.0 * 420.0 / 400.0, epsilon = 1e-6);
        assert_eq!(backtest.benchmark_ticker, "SPY");
    }

    #[test]
    fn today_is_dropped_from_both_curves() {
        let (_, backtest) =
            run_portfolio_pipeline(&port(), &holdings(), &settings(date(2024, 3, 6), GapFill::CarryTotal))
                .unwrap();

        assert_eq!(backtest.portfolio.len(), 3);
        assert_eq!(backtest.benchmark.len(), 3);
        assert_eq!(backtest.portfolio.last().unwrap().date, date(2024, 3, 5));
    }

    #[test]
    fn fetch_failure_fails_the_run() {
        let port = port().with_error("SPY", "rate limited");
        let err = run_portfolio_pipeline(
            &port,
            &holdings(),
            &settings(date(2024, 3, 7), GapFill::CarryTotal),
        )
        .unwrap_err();
        assert!(matches!(err, StockSignalError::MarketData { .. }));
    }

    #[test]
    fn duplicate_holdings_share_one_fetch() {
        let holdings = MockHoldings {
            portfolio: vec![holding("AAPL", 1.0, 9.0), holding("AAPL", 1.0, 11.0)],
            ..MockHoldings::default()
        };
        let (valuation, backtest) =
            run_portfolio_pipeline(&port(), &holdings, &settings(date(2024, 3, 7), GapFill::CarryTotal))
                .unwrap();

        assert_eq!(valuation.holdings.len(), 2);
        assert_eq!(backtest.portfolio[0].value, 20_000.0);
    }
}

mod csv_end_to_end {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, ticker: &str, closes: &[f64]) {
        let mut content = String::from("date,open,high,low,close\n");
        for (i, bar) in bars_from_closes("2024-01-01", closes).iter().enumerate() {
            content.push_str(&format!(
                "{},{},{},{},{}\n",
                bar.date,
                closes[i],
                closes[i] + 1.0,
                closes[i] - 1.0,
                closes[i]
            ));
        }
        fs::write(dir.path().join(format!("{ticker}.csv")), content).unwrap();
    }

    #[test]
    fn analysis_over_csv_files() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "AAPL", &sine_closes(90, 50.0, 10.0, 20.0));
        let port = CsvAdapter::new(dir.path().to_path_buf(), 1.0);

        let analysis = run_analysis_pipeline(&port, "AAPL", &short_config()).unwrap();

        assert_eq!(analysis.bars.len(), 90);
        assert_eq!(analysis.bars[0].high, analysis.bars[0].close + 1.0);
        assert!(analysis.daily_change.is_some());
    }
}
