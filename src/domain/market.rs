//! Concurrent bar fetching across tickers.
//!
//! Fetches are independent per ticker and run on the rayon pool. Collecting
//! the results is the barrier: callers see nothing until every fetch is done.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::error::StockSignalError;
use super::history::PriceHistory;
use crate::ports::data_port::DataPort;

/// Fetches one ticker and builds its validated history.
pub fn fetch_history<P: DataPort + ?Sized>(
    port: &P,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceHistory, StockSignalError> {
    let bars = port.fetch_bars(ticker, start, end)?;
    debug!(ticker, bars = bars.len(), "fetched bars");
    PriceHistory::new(ticker, bars)
}

/// Fetches every ticker in parallel. Any failed fetch fails the whole call;
/// results keep the input order.
pub fn fetch_histories<P: DataPort + Sync + ?Sized>(
    port: &P,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceHistory>, StockSignalError> {
    tickers
        .par_iter()
        .map(|ticker| fetch_history(port, ticker, start, end))
        .collect()
}

/// Like [`fetch_histories`], but tickers whose fetch fails are skipped with a
/// warning.
pub fn fetch_available<P: DataPort + Sync + ?Sized>(
    port: &P,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PriceHistory> {
    let results: Vec<Option<PriceHistory>> = tickers
        .par_iter()
        .map(|ticker| match fetch_history(port, ticker, start, end) {
            Ok(history) => Some(history),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "skipping ticker");
                None
            }
        })
        .collect();
    results.into_iter().flatten().collect()
}
