//! stocksignal — technical-indicator signals, single-asset strategy
//! backtests and portfolio-versus-benchmark tracking over daily bars.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
