//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single dated point in an indicator time series
//! - `IndicatorValue`: Enum for the different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A date-indexed time series of indicator values
//!
//! Series only hold points where the indicator is defined, so a series is
//! shorter than its source bars by the warmup length. Consumers look values
//! up by date rather than by array position.

pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match *self {
            IndicatorValue::Simple(v) => Some(v),
            IndicatorValue::Bollinger { .. } => None,
        }
    }

    pub fn as_bands(&self) -> Option<Bands> {
        match *self {
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } => Some(Bands {
                upper,
                middle,
                lower,
            }),
            IndicatorValue::Simple(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
    #[serde(skip)]
    date_index: BTreeMap<NaiveDate, usize>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType, values: Vec<IndicatorPoint>) -> Self {
        let date_index = values
            .iter()
            .enumerate()
            .map(|(i, point)| (point.date, i))
            .collect();
        Self {
            indicator_type,
            values,
            date_index,
        }
    }

    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self::new(indicator_type, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&IndicatorValue> {
        self.date_index.get(&date).map(|&i| &self.values[i].value)
    }

    pub fn simple(&self, date: NaiveDate) -> Option<f64> {
        self.get(date).and_then(IndicatorValue::as_simple)
    }

    pub fn bands(&self, date: NaiveDate) -> Option<Bands> {
        self.get(date).and_then(IndicatorValue::as_bands)
    }
}
