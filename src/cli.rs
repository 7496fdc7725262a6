//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_holdings_adapter::JsonHoldingsAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::{
    AnalysisConfig, DEFAULT_MA_PERIODS, TickerAnalysis, analyze_favorites, analyze_ticker,
};
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::config_validation::{
    optional_date, parse_list, parse_periods, validate_config, validate_data_config,
};
use crate::domain::detector::{BollingerDetector, BreakoutDetector, MaCrossDetector, RsiDetector};
use crate::domain::error::StockSignalError;
use crate::domain::history::PriceHistory;
use crate::domain::market::{fetch_history, fetch_histories};
use crate::domain::portfolio::{CurrencyPolicy, PortfolioValuation, value_portfolio};
use crate::domain::portfolio_backtest::{
    AssetHistory, DEFAULT_LOOKBACK_DAYS, DateRange, GapFill, PortfolioBacktestConfig,
    PortfolioBacktestResult, run_portfolio_backtest,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::holdings_port::HoldingsPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_BENCHMARK: &str = "SPY";
const DEFAULT_OUTPUT: &str = "report.json";

#[derive(Parser, Debug)]
#[command(
    name = "stocksignal",
    about = "Technical signals, strategy backtests and portfolio tracking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one ticker: indicators, signals and per-strategy backtests
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze every ticker in the favorites list
    Favorites {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Value the portfolio and backtest it against the benchmark
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the bar count and date range for a ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
    },
}

/// Installs the stderr fmt subscriber. `RUST_LOG` overrides the INFO default.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            ticker,
            output,
        } => run_analyze(&config, &ticker, output.as_deref()),
        Command::Favorites { config, output } => run_favorites(&config, output.as_deref()),
        Command::Portfolio {
            config,
            today,
            output,
        } => run_portfolio(&config, today, output.as_deref()),
        Command::Info { config, ticker } => run_info(&config, &ticker),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockSignalError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

/// CSV market data rooted at `[data] dir`.
pub fn build_data_port(adapter: &dyn ConfigPort) -> Result<CsvAdapter, StockSignalError> {
    validate_data_config(adapter)?;
    let dir = adapter
        .get_string("data", "dir")
        .ok_or_else(|| StockSignalError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    Ok(CsvAdapter::new(
        PathBuf::from(dir.trim()),
        adapter.get_double("data", "exchange_rate", 1.0),
    ))
}

pub fn build_holdings_port(
    adapter: &dyn ConfigPort,
) -> Result<JsonHoldingsAdapter, StockSignalError> {
    match adapter.get_string("portfolio", "holdings_file") {
        Some(path) if !path.trim().is_empty() => {
            Ok(JsonHoldingsAdapter::new(PathBuf::from(path.trim())))
        }
        _ => Err(StockSignalError::ConfigMissing {
            section: "portfolio".into(),
            key: "holdings_file".into(),
        }),
    }
}

fn signal_period(
    adapter: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, StockSignalError> {
    let value = adapter.get_int("signals", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| StockSignalError::ConfigInvalid {
            section: "signals".into(),
            key: key.into(),
            reason: format!("{key} must be at least 1"),
        })
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, StockSignalError> {
    let defaults = AnalysisConfig::default();

    let ma_periods = match adapter.get_string("signals", "ma_periods") {
        Some(s) => parse_periods(&s, "signals", "ma_periods")?,
        None => DEFAULT_MA_PERIODS.to_vec(),
    };

    let multiplier = adapter.get_double("signals", "bollinger_multiplier", 2.0);

    Ok(AnalysisConfig {
        rsi: RsiDetector {
            period: signal_period(adapter, "rsi_period", defaults.rsi.period)?,
            oversold: adapter.get_double("signals", "rsi_oversold", defaults.rsi.oversold),
            overbought: adapter.get_double("signals", "rsi_overbought", defaults.rsi.overbought),
        },
        bollinger: BollingerDetector {
            period: signal_period(adapter, "bollinger_period", defaults.bollinger.period)?,
            stddev_mult_x100: (multiplier * 100.0).round() as u32,
        },
        ma_cross: MaCrossDetector {
            fast: signal_period(adapter, "ma_fast", defaults.ma_cross.fast)?,
            slow: signal_period(adapter, "ma_slow", defaults.ma_cross.slow)?,
        },
        breakout: BreakoutDetector {
            period: signal_period(adapter, "breakout_period", defaults.breakout.period)?,
        },
        ma_periods,
        backtest: BacktestConfig {
            initial_capital: adapter.get_double(
                "backtest",
                "initial_capital",
                DEFAULT_INITIAL_CAPITAL,
            ),
        },
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSettings {
    pub benchmark: String,
    pub backtest: PortfolioBacktestConfig,
}

pub fn build_portfolio_settings(
    adapter: &dyn ConfigPort,
    today: NaiveDate,
    exchange_rate: f64,
) -> Result<PortfolioSettings, StockSignalError> {
    let benchmark = adapter
        .get_string("portfolio", "benchmark")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());

    let domestic_suffixes = match adapter.get_string("portfolio", "domestic_suffixes") {
        Some(s) => parse_list(&s),
        None => CurrencyPolicy::default().domestic_suffixes,
    };

    let lookback = adapter.get_int("portfolio", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    let start = match optional_date(adapter, "portfolio", "start_date")? {
        Some(start) => start,
        None => {
            DateRange::trailing(today, lookback)
                .ok_or_else(|| StockSignalError::ConfigInvalid {
                    section: "portfolio".into(),
                    key: "lookback_days".into(),
                    reason: format!("lookback of {lookback} days from {today} is out of range"),
                })?
                .start
        }
    };
    let range = DateRange {
        start,
        end: optional_date(adapter, "portfolio", "end_date")?.unwrap_or(today),
    };

    let gap_fill = match adapter.get_string("portfolio", "gap_fill") {
        Some(s) => s
            .parse::<GapFill>()
            .map_err(|reason| StockSignalError::ConfigInvalid {
                section: "portfolio".into(),
                key: "gap_fill".into(),
                reason,
            })?,
        None => GapFill::default(),
    };

    Ok(PortfolioSettings {
        benchmark,
        backtest: PortfolioBacktestConfig {
            range,
            today,
            currency: CurrencyPolicy {
                exchange_rate,
                domestic_suffixes,
            },
            gap_fill,
        },
    })
}

/// `--output`, then `[report] output`, then `report.json`.
pub fn resolve_output(output_override: Option<&Path>, adapter: &dyn ConfigPort) -> PathBuf {
    if let Some(p) = output_override {
        return p.to_path_buf();
    }
    adapter
        .get_string("report", "output")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn print_analysis_summary(analysis: &TickerAnalysis) {
    eprintln!("\n=== {} ===", analysis.ticker);
    if let Some(change) = &analysis.daily_change {
        eprintln!(
            "Last close:       {:.2} ({:+.2}, {:+.2}%)",
            change.latest_close, change.change, change.percent
        );
    }
    for strategy in &analysis.strategies {
        eprintln!(
            "{:<10} {:>3} signals, {:>3} trades, equity {:.2}, return {:+.2}%, max drawdown -{:.1}%",
            strategy.source.to_string(),
            strategy.signals.len(),
            strategy.metrics.total_trades,
            strategy.backtest.final_equity(),
            strategy.metrics.total_return * 100.0,
            strategy.metrics.max_drawdown * 100.0,
        );
    }
    if let Some(last) = analysis.breakouts.last() {
        eprintln!(
            "Last breakout:    {} (close {:.2} over {:.2})",
            last.date, last.close, last.moving_average
        );
    }
}

pub fn run_analysis_pipeline<P: DataPort + Sync + ?Sized>(
    data_port: &P,
    ticker: &str,
    config: &AnalysisConfig,
) -> Result<TickerAnalysis, StockSignalError> {
    let history = fetch_history(data_port, ticker, NaiveDate::MIN, NaiveDate::MAX)?;
    analyze_ticker(ticker, history.bars, config)
}

fn run_analyze(config_path: &Path, ticker: &str, output: Option<&Path>) -> Result<(), StockSignalError> {
    let adapter = load_config(config_path)?;
    let config = build_analysis_config(&adapter)?;
    let data_port = build_data_port(&adapter)?;

    let analysis = run_analysis_pipeline(&data_port, ticker, &config)?;
    print_analysis_summary(&analysis);

    let output = resolve_output(output, &adapter);
    JsonReportAdapter::new().write_analysis(std::slice::from_ref(&analysis), &output)?;
    eprintln!("\nReport written to: {}", output.display());
    Ok(())
}

pub fn run_favorites_pipeline<P: DataPort + Sync + ?Sized>(
    data_port: &P,
    holdings: &dyn HoldingsPort,
    config: &AnalysisConfig,
) -> Result<Vec<TickerAnalysis>, StockSignalError> {
    let favorites = holdings.load_favorites()?;
    info!(count = favorites.len(), "analyzing favorites");
    if favorites.is_empty() {
        return Ok(Vec::new());
    }

    let analyses = analyze_favorites(data_port, &favorites, NaiveDate::MIN, NaiveDate::MAX, config);
    if analyses.is_empty() {
        return Err(StockSignalError::NoData {
            ticker: favorites.join(","),
        });
    }
    Ok(analyses)
}

fn run_favorites(config_path: &Path, output: Option<&Path>) -> Result<(), StockSignalError> {
    let adapter = load_config(config_path)?;
    let config = build_analysis_config(&adapter)?;
    let data_port = build_data_port(&adapter)?;
    let holdings = build_holdings_port(&adapter)?;

    let analyses = run_favorites_pipeline(&data_port, &holdings, &config)?;
    for analysis in &analyses {
        print_analysis_summary(analysis);
    }

    let output = resolve_output(output, &adapter);
    JsonReportAdapter::new().write_analysis(&analyses, &output)?;
    eprintln!("\nReport written to: {}", output.display());
    Ok(())
}

pub fn run_portfolio_pipeline<P: DataPort + Sync + ?Sized>(
    data_port: &P,
    holdings: &dyn HoldingsPort,
    settings: &PortfolioSettings,
) -> Result<(PortfolioValuation, PortfolioBacktestResult), StockSignalError> {
    let portfolio = holdings.load_portfolio()?;
    let range = settings.backtest.range;

    let mut tickers: Vec<String> = portfolio.iter().map(|h| h.ticker.clone()).collect();
    tickers.push(settings.benchmark.clone());
    tickers.sort();
    tickers.dedup();

    let histories: HashMap<String, PriceHistory> =
        fetch_histories(data_port, &tickers, range.start, range.end)?
            .into_iter()
            .map(|h| (h.ticker.clone(), h))
            .collect();

    let lookup = |ticker: &str| {
        histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| StockSignalError::NoData {
                ticker: ticker.to_string(),
            })
    };

    let latest_prices: HashMap<String, f64> = histories
        .iter()
        .filter_map(|(t, h)| h.latest_close().map(|c| (t.clone(), c)))
        .collect();
    let valuation = value_portfolio(&portfolio, &latest_prices, &settings.backtest.currency);

    let assets = portfolio
        .iter()
        .map(|holding| {
            Ok(AssetHistory {
                holding: holding.clone(),
                history: lookup(&holding.ticker)?,
            })
        })
        .collect::<Result<Vec<_>, StockSignalError>>()?;
    let benchmark = lookup(&settings.benchmark)?;

    let backtest = run_portfolio_backtest(&assets, &benchmark, &settings.backtest);
    Ok((valuation, backtest))
}

fn run_portfolio(
    config_path: &Path,
    today: Option<NaiveDate>,
    output: Option<&Path>,
) -> Result<(), StockSignalError> {
    let adapter = load_config(config_path)?;
    let data_port = build_data_port(&adapter)?;
    let holdings = build_holdings_port(&adapter)?;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let settings = build_portfolio_settings(&adapter, today, data_port.exchange_rate()?)?;
    eprintln!(
        "Portfolio backtest: {} to {} vs {}",
        settings.backtest.range.start, settings.backtest.range.end, settings.benchmark
    );

    let (valuation, backtest) = run_portfolio_pipeline(&data_port, &holdings, &settings)?;

    eprintln!("\n=== Portfolio ===");
    eprintln!("Total Assets:     {:.2}", valuation.total_assets);
    eprintln!("Total Investment: {:.2}", valuation.total_investment);
    eprintln!("Profit:           {:+.2}", valuation.total_profit());
    for h in &valuation.holdings {
        eprintln!(
            "  {}: {:.2} @ {:.2} ({:+.2}%), weight {:.1}%",
            h.ticker,
            h.quantity,
            h.current_price,
            h.profit_rate_pct,
            h.weight * 100.0
        );
    }
    if let (Some(p), Some(b)) = (backtest.portfolio.last(), backtest.benchmark.last()) {
        eprintln!(
            "Backtest end:     portfolio {:.2}, {} {:.2} ({} dates)",
            p.value,
            backtest.benchmark_ticker,
            b.value,
            backtest.portfolio.len()
        );
    }

    let output = resolve_output(output, &adapter);
    JsonReportAdapter::new().write_portfolio(&valuation, &backtest, &output)?;
    eprintln!("\nReport written to: {}", output.display());
    Ok(())
}

fn run_info(config_path: &Path, ticker: &str) -> Result<(), StockSignalError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let data_port = build_data_port(&adapter)?;

    match data_port.get_data_range(ticker)? {
        Some((min_date, max_date, count)) => {
            println!("{}: {} bars, {} to {}", ticker, count, min_date, max_date);
            Ok(())
        }
        None => Err(StockSignalError::NoData {
            ticker: ticker.to_string(),
        }),
    }
}
