//! Rendering/report output port.

use crate::domain::analysis::TickerAnalysis;
use crate::domain::error::StockSignalError;
use crate::domain::portfolio::PortfolioValuation;
use crate::domain::portfolio_backtest::PortfolioBacktestResult;
use std::path::Path;

pub trait ReportPort {
    fn write_analysis(
        &self,
        analyses: &[TickerAnalysis],
        output_path: &Path,
    ) -> Result<(), StockSignalError>;

    fn write_portfolio(
        &self,
        valuation: &PortfolioValuation,
        backtest: &PortfolioBacktestResult,
        output_path: &Path,
    ) -> Result<(), StockSignalError>;
}
