//! JSON report writer for the rendering layer.

use crate::domain::analysis::TickerAnalysis;
use crate::domain::error::StockSignalError;
use crate::domain::portfolio::PortfolioValuation;
use crate::domain::portfolio_backtest::PortfolioBacktestResult;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct PortfolioReport<'a> {
    valuation: &'a PortfolioValuation,
    total_profit: f64,
    backtest: &'a PortfolioBacktestResult,
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        output_path: &Path,
    ) -> Result<(), StockSignalError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StockSignalError::Report {
            reason: format!("failed to serialize report: {e}"),
        })?;
        fs::write(output_path, json).map_err(|e| StockSignalError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        info!(path = %output_path.display(), "report written");
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_analysis(
        &self,
        analyses: &[TickerAnalysis],
        output_path: &Path,
    ) -> Result<(), StockSignalError> {
        self.write_json(analyses, output_path)
    }

    fn write_portfolio(
        &self,
        valuation: &PortfolioValuation,
        backtest: &PortfolioBacktestResult,
        output_path: &Path,
    ) -> Result<(), StockSignalError> {
        let report = PortfolioReport {
            valuation,
            total_profit: valuation.total_profit(),
            backtest,
        };
        self.write_json(&report, output_path)
    }
}
