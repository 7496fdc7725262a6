//! User store port: favorites and portfolio holdings.

use crate::domain::error::StockSignalError;
use crate::domain::portfolio::PortfolioHolding;

pub trait HoldingsPort {
    fn load_favorites(&self) -> Result<Vec<String>, StockSignalError>;
    fn load_portfolio(&self) -> Result<Vec<PortfolioHolding>, StockSignalError>;
}
