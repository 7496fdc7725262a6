//! Market-data port: bar histories and the currency exchange rate.

use crate::domain::error::StockSignalError;
use crate::domain::ohlcv::OhlcBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `ticker` within `[start_date, end_date]`, in the provider's
    /// order. Ordering is checked by the domain, not here.
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcBar>, StockSignalError>;

    /// Foreign-to-domestic conversion rate.
    fn exchange_rate(&self) -> Result<f64, StockSignalError>;

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockSignalError>;
}
