//! Core domain types and logic.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod signal;
pub mod detector;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod portfolio;
pub mod history;
pub mod portfolio_backtest;
pub mod market;
pub mod analysis;
pub mod config_validation;
