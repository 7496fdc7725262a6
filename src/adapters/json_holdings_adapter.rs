//! JSON file user store.
//!
//! The file holds one user record whose list fields are themselves
//! serialized JSON strings:
//!
//! ```json
//! { "favorites": "[\"AAPL\",\"005930.KS\"]",
//!   "portfolio": "[{\"ticker\":\"AAPL\",\"quantity\":3,\"avgPrice\":120}]" }
//! ```
//!
//! A missing, null or empty field is an empty list.

use crate::domain::error::StockSignalError;
use crate::domain::portfolio::PortfolioHolding;
use crate::ports::holdings_port::HoldingsPort;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
struct UserRecord {
    #[serde(default, alias = "favorite")]
    favorites: Option<String>,
    #[serde(default)]
    portfolio: Option<String>,
}

pub struct JsonHoldingsAdapter {
    path: PathBuf,
}

impl JsonHoldingsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_record(&self) -> Result<UserRecord, StockSignalError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            StockSignalError::HoldingsParse {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            }
        })?;
        serde_json::from_str(&content).map_err(|e| StockSignalError::HoldingsParse {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }
}

fn decode_blob<T: DeserializeOwned>(blob: Option<&str>, field: &str) -> Result<Vec<T>, StockSignalError> {
    match blob.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(|e| StockSignalError::HoldingsParse {
            reason: format!("invalid {field} blob: {e}"),
        }),
    }
}

impl HoldingsPort for JsonHoldingsAdapter {
    fn load_favorites(&self) -> Result<Vec<String>, StockSignalError> {
        let record = self.read_record()?;
        decode_blob(record.favorites.as_deref(), "favorites")
    }

    fn load_portfolio(&self) -> Result<Vec<PortfolioHolding>, StockSignalError> {
        let record = self.read_record()?;
        decode_blob(record.portfolio.as_deref(), "portfolio")
    }
}
