//! Portfolio backtest: aggregate holding value over a merged calendar,
//! compared against a benchmark normalized to the portfolio's first value.
//!
//! Steps:
//! 1. Union of all holding and benchmark dates inside the range, ascending.
//! 2. Per date, sum `quantity × close × currency factor` over holdings, with
//!    gaps filled according to [`GapFill`].
//! 3. Benchmark starts at the portfolio's first value and compounds the
//!    benchmark's close-to-close return; a missing bar on either side of a
//!    transition carries the previous value.
//! 4. The point dated `today` is dropped from both outputs.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::history::{PriceHistory, build_unified_timeline};
use super::portfolio::{CurrencyPolicy, EquityPoint, PortfolioHolding};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// How a date on which some holding has no bar is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// Reuse the whole previous portfolio total. On the first date, missing
    /// holdings contribute zero.
    #[default]
    CarryTotal,
    /// Each missing holding reuses its own last contribution (zero before its
    /// first bar).
    PerAsset,
}

impl FromStr for GapFill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "carry_total" => Ok(GapFill::CarryTotal),
            "per_asset" => Ok(GapFill::PerAsset),
            other => Err(format!(
                "unknown gap fill mode '{other}' (expected carry_total or per_asset)"
            )),
        }
    }
}

impl fmt::Display for GapFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapFill::CarryTotal => write!(f, "carry_total"),
            GapFill::PerAsset => write!(f, "per_asset"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `[today - days, today]`, or `None` when the start falls outside the
    /// representable calendar.
    pub fn trailing(today: NaiveDate, days: i64) -> Option<Self> {
        let start = Duration::try_days(days).and_then(|d| today.checked_sub_signed(d))?;
        Some(Self { start, end: today })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioBacktestConfig {
    pub range: DateRange,
    /// Dropped from the output as an incomplete trading day.
    pub today: NaiveDate,
    pub currency: CurrencyPolicy,
    pub gap_fill: GapFill,
}

impl PortfolioBacktestConfig {
    /// Trailing-year range ending `today` with default currency handling.
    pub fn trailing_year(today: NaiveDate) -> Self {
        Self {
            range: DateRange::trailing(today, DEFAULT_LOOKBACK_DAYS).unwrap_or(DateRange {
                start: NaiveDate::MIN,
                end: today,
            }),
            today,
            currency: CurrencyPolicy::default(),
            gap_fill: GapFill::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetHistory {
    pub holding: PortfolioHolding,
    pub history: PriceHistory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioBacktestResult {
    pub benchmark_ticker: String,
    pub portfolio: Vec<EquityPoint>,
    pub benchmark: Vec<EquityPoint>,
}

pub fn run_portfolio_backtest(
    assets: &[AssetHistory],
    benchmark: &PriceHistory,
    config: &PortfolioBacktestConfig,
) -> PortfolioBacktestResult {
    let mut histories: Vec<&PriceHistory> = assets.iter().map(|a| &a.history).collect();
    histories.push(benchmark);
    let timeline = build_unified_timeline(&histories, config.range.start, config.range.end);

    let portfolio_values = portfolio_series(assets, &timeline, config);
    let benchmark_values = benchmark_series(benchmark, &timeline, &portfolio_values);

    let (portfolio, benchmark_curve): (Vec<EquityPoint>, Vec<EquityPoint>) = timeline
        .iter()
        .zip(portfolio_values.iter().zip(benchmark_values.iter()))
        .filter(|(date, _)| **date != config.today)
        .map(|(&date, (&p, &b))| {
            (
                EquityPoint { date, value: p },
                EquityPoint { date, value: b },
            )
        })
        .unzip();

    info!(
        holdings = assets.len(),
        benchmark = %benchmark.ticker,
        dates = portfolio.len(),
        gap_fill = %config.gap_fill,
        "portfolio backtest finished"
    );

    PortfolioBacktestResult {
        benchmark_ticker: benchmark.ticker.clone(),
        portfolio,
        benchmark: benchmark_curve,
    }
}

fn portfolio_series(
    assets: &[AssetHistory],
    timeline: &[NaiveDate],
    config: &PortfolioBacktestConfig,
) -> Vec<f64> {
    let mut values = Vec::with_capacity(timeline.len());
    let mut last_contribution = vec![0.0; assets.len()];

    for &date in timeline {
        let mut total = 0.0;
        let mut any_missing = false;

        for (i, asset) in assets.iter().enumerate() {
            match asset.history.close_on(date) {
                Some(close) => {
                    let contribution = asset.holding.quantity
                        * config.currency.convert(&asset.holding.ticker, close);
                    last_contribution[i] = contribution;
                    total += contribution;
                }
                None => {
                    any_missing = true;
                    if config.gap_fill == GapFill::PerAsset {
                        total += last_contribution[i];
                    }
                }
            }
        }

        let value = match (config.gap_fill, values.last()) {
            (GapFill::CarryTotal, Some(&previous)) if any_missing => previous,
            _ => total,
        };
        values.push(value);
    }

    values
}

fn benchmark_series(
    benchmark: &PriceHistory,
    timeline: &[NaiveDate],
    portfolio_values: &[f64],
) -> Vec<f64> {
    let mut values: Vec<f64> = Vec::with_capacity(timeline.len());

    for (i, &date) in timeline.iter().enumerate() {
        let Some(&previous) = values.last() else {
            values.push(portfolio_values[0]);
            continue;
        };

        let change = match (benchmark.close_on(timeline[i - 1]), benchmark.close_on(date)) {
            (Some(prev_close), Some(close)) if prev_close != 0.0 => {
                (close - prev_close) / prev_close
            }
            _ => 0.0,
        };
        values.push(previous * (1.0 + change));
    }

    values
}
