#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stocksignal::domain::error::StockSignalError;
pub use stocksignal::domain::ohlcv::OhlcBar;
use stocksignal::domain::portfolio::PortfolioHolding;
use stocksignal::ports::data_port::DataPort;
use stocksignal::ports::holdings_port::HoldingsPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcBar>>,
    pub errors: HashMap<String, String>,
    pub exchange_rate: f64,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            exchange_rate: 1.0,
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_exchange_rate(mut self, rate: f64) -> Self {
        self.exchange_rate = rate;
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcBar>, StockSignalError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockSignalError::MarketData {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn exchange_rate(&self) -> Result<f64, StockSignalError> {
        Ok(self.exchange_rate)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockSignalError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockSignalError::MarketData {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MockHoldings {
    pub favorites: Vec<String>,
    pub portfolio: Vec<PortfolioHolding>,
}

impl HoldingsPort for MockHoldings {
    fn load_favorites(&self) -> Result<Vec<String>, StockSignalError> {
        Ok(self.favorites.clone())
    }

    fn load_portfolio(&self) -> Result<Vec<PortfolioHolding>, StockSignalError> {
        Ok(self.portfolio.clone())
    }
}

pub fn holding(ticker: &str, quantity: f64, average_cost: f64) -> PortfolioHolding {
    PortfolioHolding {
        ticker: ticker.to_string(),
        quantity,
        average_cost,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcBar {
    OhlcBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
    }
}

/// Consecutive calendar days starting at `start_date`, one close per day.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcBar::flat(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<OhlcBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(start_date, &closes)
}

/// A close series that oscillates enough to trigger every detector.
pub fn sine_closes(count: usize, base: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..count)
        .map(|i| base + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect()
}
