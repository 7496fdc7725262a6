//! CSV file market-data adapter.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with header
//! `date,open,high,low,close`. Rows are returned in file order; every price
//! must be positive.

use crate::domain::error::StockSignalError;
use crate::domain::ohlcv::OhlcBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
    exchange_rate: f64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf, exchange_rate: f64) -> Self {
        Self {
            base_path,
            exchange_rate,
        }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<OhlcBar>, StockSignalError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| StockSignalError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockSignalError::MarketData {
                reason: format!("{ticker}: CSV parse error: {e}"),
            })?;
            bars.push(parse_record(ticker, row + 1, &record)?);
        }

        Ok(bars)
    }
}

fn field<'a>(
    ticker: &str,
    row: usize,
    record: &'a StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, StockSignalError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| StockSignalError::MarketData {
            reason: format!("{ticker} row {row}: missing {name} column"),
        })
}

fn price(
    ticker: &str,
    row: usize,
    record: &StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, StockSignalError> {
    let raw = field(ticker, row, record, index, name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err(StockSignalError::MarketData {
            reason: format!("{ticker} row {row}: {name} must be a positive price, got '{raw}'"),
        }),
        Err(_) => Err(StockSignalError::MarketData {
            reason: format!("{ticker} row {row}: invalid {name} value '{raw}'"),
        }),
    }
}

fn parse_record(
    ticker: &str,
    row: usize,
    record: &StringRecord,
) -> Result<OhlcBar, StockSignalError> {
    let date_str = field(ticker, row, record, 0, "date")?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        StockSignalError::MarketData {
            reason: format!("{ticker} row {row}: invalid date '{date_str}': {e}"),
        }
    })?;

    Ok(OhlcBar {
        date,
        open: price(ticker, row, record, 1, "open")?,
        high: price(ticker, row, record, 2, "high")?,
        low: price(ticker, row, record, 3, "low")?,
        close: price(ticker, row, record, 4, "close")?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcBar>, StockSignalError> {
        let mut bars = self.read_all(ticker)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn exchange_rate(&self) -> Result<f64, StockSignalError> {
        Ok(self.exchange_rate)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockSignalError> {
        let bars = self.read_all(ticker)?;
        let min = bars.iter().map(|b| b.date).min();
        let max = bars.iter().map(|b| b.date).max();
        Ok(min.zip(max).map(|(min, max)| (min, max, bars.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close\n\
            2024-01-15,100.0,110.0,90.0,105.0\n\
            2024-01-16,105.0,115.0,100.0,110.0\n\
            2024-01-17,110.0,120.0,105.0,115.0\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("005930.KS.csv"), "date,open,high,low,close\n").unwrap();
        fs::write(
            path.join("REV.csv"),
            "date,open,high,low,close\n2024-01-03,1,1,1,3\n2024-01-01,1,1,1,1\n",
        )
        .unwrap();
        fs::write(
            path.join("ZERO.csv"),
            "date,open,high,low,close\n2024-01-02,1,1,1,2\n2024-01-03,1,1,1,0\n",
        )
        .unwrap();
        fs::write(
            path.join("NEG.csv"),
            "date,open,high,low,close\n2024-01-02,-1,1,1,2\n",
        )
        .unwrap();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close\n2024-01-03,1,1,1,abc\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        let bars = adapter.fetch_bars("AAPL", d(15), d(17)).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, d(15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        let bars = adapter.fetch_bars("AAPL", d(16), d(16)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d(16));
    }

    #[test]
    fn file_order_is_preserved() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        let bars = adapter.fetch_bars("REV", d(1), d(31)).unwrap();
        assert_eq!(bars[0].date, d(3));
        assert_eq!(bars[1].date, d(1));
    }

    #[test]
    fn suffixed_tickers_resolve_to_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);
        assert!(adapter.fetch_bars("005930.KS", d(1), d(31)).unwrap().is_empty());
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        match adapter.fetch_bars("ZERO", d(1), d(31)) {
            Err(StockSignalError::MarketData { reason }) => {
                assert!(reason.contains("row 2"), "{reason}");
                assert!(reason.contains("close"), "{reason}");
            }
            other => panic!("expected MarketData, got {other:?}"),
        }
        assert!(matches!(
            adapter.fetch_bars("NEG", d(1), d(31)),
            Err(StockSignalError::MarketData { reason }) if reason.contains("open")
        ));
    }

    #[test]
    fn missing_file_is_market_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        let result = adapter.fetch_bars("XYZ", d(1), d(31));
        assert!(matches!(result, Err(StockSignalError::MarketData { .. })));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        let err = adapter.fetch_bars("BAD", d(1), d(31)).unwrap_err();
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn exchange_rate_comes_from_construction() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1320.0);
        assert_eq!(adapter.exchange_rate().unwrap(), 1320.0);
    }

    #[test]
    fn data_range_reports_bounds() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path, 1.0);

        assert_eq!(adapter.get_data_range("AAPL").unwrap(), Some((d(15), d(17), 3)));
        assert_eq!(adapter.get_data_range("REV").unwrap(), Some((d(1), d(3), 2)));
        assert_eq!(adapter.get_data_range("005930.KS").unwrap(), None);
    }
}
