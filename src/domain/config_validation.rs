//! Configuration validation.
//!
//! Validates all config fields before any data is fetched. Missing optional
//! keys fall back to their defaults and are not errors.

use crate::domain::error::StockSignalError;
use crate::domain::portfolio_backtest::{GapFill, MAX_LOOKBACK_DAYS};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockSignalError> {
    validate_data_config(config)?;
    validate_backtest_config(config)?;
    validate_signal_config(config)?;
    validate_portfolio_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StockSignalError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(StockSignalError::ConfigMissing {
                section: "data".to_string(),
                key: "dir".to_string(),
            });
        }
    }
    let rate = config.get_double("data", "exchange_rate", 1.0);
    if rate <= 0.0 {
        return Err(invalid("data", "exchange_rate", "exchange_rate must be positive"));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StockSignalError> {
    let value = config.get_double("backtest", "initial_capital", 1.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), StockSignalError> {
    for key in ["rsi_period", "bollinger_period", "ma_fast", "ma_slow", "breakout_period"] {
        if config.get_int("signals", key, 1) < 1 {
            return Err(invalid("signals", key, &format!("{key} must be at least 1")));
        }
    }

    let oversold = config.get_double("signals", "rsi_oversold", 30.0);
    let overbought = config.get_double("signals", "rsi_overbought", 70.0);
    if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "signals",
            "rsi_oversold",
            "rsi thresholds must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "signals",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }

    // Stored as hundredths in the indicator type.
    let multiplier = config.get_double("signals", "bollinger_multiplier", 2.0);
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(invalid(
            "signals",
            "bollinger_multiplier",
            "bollinger_multiplier must be positive",
        ));
    }
    let hundredths = multiplier * 100.0;
    if hundredths > u32::MAX as f64 || (hundredths - hundredths.round()).abs() > 1e-6 {
        return Err(invalid(
            "signals",
            "bollinger_multiplier",
            "bollinger_multiplier allows at most two decimal places",
        ));
    }

    if config.get_int("signals", "ma_fast", 20) >= config.get_int("signals", "ma_slow", 60) {
        return Err(invalid("signals", "ma_fast", "ma_fast must be below ma_slow"));
    }

    if let Some(s) = config.get_string("signals", "ma_periods") {
        parse_periods(&s, "signals", "ma_periods")?;
    }
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), StockSignalError> {
    let lookback = config.get_int("portfolio", "lookback_days", 365);
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback) {
        return Err(invalid(
            "portfolio",
            "lookback_days",
            &format!("lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}"),
        ));
    }

    if let Some(s) = config.get_string("portfolio", "gap_fill") {
        s.parse::<GapFill>()
            .map_err(|reason| invalid("portfolio", "gap_fill", &reason))?;
    }

    if let Some(s) = config.get_string("portfolio", "benchmark") {
        if s.trim().is_empty() {
            return Err(invalid("portfolio", "benchmark", "benchmark must not be empty"));
        }
    }

    let start = optional_date(config, "portfolio", "start_date")?;
    let end = optional_date(config, "portfolio", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "portfolio",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

/// Parses an optional `YYYY-MM-DD` value.
pub fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StockSignalError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    section,
                    key,
                    &format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

/// Parses a comma-separated list of positive periods, e.g. `5,20,60`.
pub fn parse_periods(
    value: &str,
    section: &str,
    key: &str,
) -> Result<Vec<usize>, StockSignalError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(p) if p > 0 => Ok(p),
            _ => Err(invalid(
                section,
                key,
                &format!("'{s}' is not a positive period"),
            )),
        })
        .collect()
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn invalid(section: &str, key: &str, reason: &str) -> StockSignalError {
    StockSignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
