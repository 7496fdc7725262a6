//! Buy/sell signal events and the per-detector position state machine.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalKind {
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "Buy"),
            SignalKind::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalSource {
    Rsi,
    Bollinger,
    MaCross,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSource::Rsi => write!(f, "RSI"),
            SignalSource::Bollinger => write!(f, "Bollinger"),
            SignalSource::MaCross => write!(f, "MACross"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub price: f64,
    pub source: SignalSource,
    pub annotation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Holding,
}

/// Two-state Flat/Holding machine owned by one detection pass.
///
/// Only `Flat -> Holding` can yield a Buy and only `Holding -> Flat` a Sell,
/// so signals from one machine always alternate starting with a Buy.
#[derive(Debug, Default)]
pub struct PositionMachine {
    state: PositionState,
}

impl PositionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Feeds the entry/exit conditions for one step and returns the
    /// transition taken, if any. Conditions irrelevant to the current state
    /// are ignored.
    pub fn step(&mut self, enter: bool, exit: bool) -> Option<SignalKind> {
        match self.state {
            PositionState::Flat if enter => {
                self.state = PositionState::Holding;
                Some(SignalKind::Buy)
            }
            PositionState::Holding if exit => {
                self.state = PositionState::Flat;
                Some(SignalKind::Sell)
            }
            _ => None,
        }
    }
}
