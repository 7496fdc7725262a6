//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stocksignal.
#[derive(Debug, thiserror::Error)]
pub enum StockSignalError {
    #[error("bars for {ticker} out of order at index {index} ({date}): dates must be strictly ascending")]
    InvalidInputOrder {
        ticker: String,
        index: usize,
        date: NaiveDate,
    },

    #[error("signal list mixes sources {first} and {second}")]
    MixedSignalSources { first: String, second: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("holdings parse error: {reason}")]
    HoldingsParse { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockSignalError> for std::process::ExitCode {
    fn from(err: &StockSignalError) -> Self {
        let code: u8 = match err {
            StockSignalError::Io(_) | StockSignalError::Report { .. } => 1,
            StockSignalError::ConfigParse { .. }
            | StockSignalError::ConfigMissing { .. }
            | StockSignalError::ConfigInvalid { .. } => 2,
            StockSignalError::MarketData { .. } => 3,
            StockSignalError::InvalidInputOrder { .. }
            | StockSignalError::MixedSignalSources { .. } => 4,
            StockSignalError::NoData { .. } => 5,
            StockSignalError::HoldingsParse { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
