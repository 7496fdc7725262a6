//! Portfolio holdings, currency conversion and point-in-time valuation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A position owned by the caller; read-only to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    pub ticker: String,
    pub quantity: f64,
    #[serde(rename = "averageCost", alias = "avgPrice", alias = "average_cost")]
    pub average_cost: f64,
}

/// Converts foreign-currency values into the domestic currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyPolicy {
    pub exchange_rate: f64,
    pub domestic_suffixes: Vec<String>,
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self {
            exchange_rate: 1.0,
            domestic_suffixes: vec![".KS".to_string(), ".KQ".to_string()],
        }
    }
}

impl CurrencyPolicy {
    pub fn is_domestic(&self, ticker: &str) -> bool {
        self.domestic_suffixes.iter().any(|s| ticker.ends_with(s.as_str()))
    }

    /// 1 for domestic tickers, the exchange rate otherwise.
    pub fn factor(&self, ticker: &str) -> f64 {
        if self.is_domestic(ticker) {
            1.0
        } else {
            self.exchange_rate
        }
    }

    pub fn convert(&self, ticker: &str, amount: f64) -> f64 {
        amount * self.factor(ticker)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: f64,
    pub current_price: f64,
    /// Converted to the domestic currency.
    pub market_value: f64,
    /// Converted to the domestic currency.
    pub invested: f64,
    /// In the ticker's own currency.
    pub profit: f64,
    pub profit_rate_pct: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValuation>,
    pub total_assets: f64,
    pub total_investment: f64,
}

impl PortfolioValuation {
    pub fn total_profit(&self) -> f64 {
        self.total_assets - self.total_investment
    }
}

/// Values each holding at its latest price. Holdings with no known price are
/// valued at zero.
pub fn value_portfolio(
    holdings: &[PortfolioHolding],
    latest_prices: &HashMap<String, f64>,
    policy: &CurrencyPolicy,
) -> PortfolioValuation {
    let mut rows: Vec<HoldingValuation> = holdings
        .iter()
        .map(|h| {
            let current_price = match latest_prices.get(&h.ticker) {
                Some(&p) => p,
                None => {
                    warn!(ticker = %h.ticker, "no latest price, valuing at zero");
                    0.0
                }
            };
            let profit_rate_pct = if h.average_cost != 0.0 {
                (current_price - h.average_cost) / h.average_cost * 100.0
            } else {
                0.0
            };
            HoldingValuation {
                ticker: h.ticker.clone(),
                quantity: h.quantity,
                average_cost: h.average_cost,
                current_price,
                market_value: policy.convert(&h.ticker, h.quantity * current_price),
                invested: policy.convert(&h.ticker, h.quantity * h.average_cost),
                profit: (current_price - h.average_cost) * h.quantity,
                profit_rate_pct,
                weight: 0.0,
            }
        })
        .collect();

    let total_assets: f64 = rows.iter().map(|r| r.market_value).sum();
    let total_investment: f64 = rows.iter().map(|r| r.invested).sum();

    if total_assets != 0.0 {
        for row in &mut rows {
            row.weight = row.market_value / total_assets;
        }
    }

    PortfolioValuation {
        holdings: rows,
        total_assets,
        total_investment,
    }
}
