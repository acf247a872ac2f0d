//! Rolling-window indicator primitives.
//!
//! Every indicator maps a bar slice to an [`IndicatorSeries`] aligned 1:1
//! with the input. Points whose window is not yet full carry `valid: false`
//! and a value of `0.0` that callers must not read.

pub mod change;
pub mod rsi;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    pub fn warmup(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    /// The value, if the point is past its warmup.
    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

/// Bar field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Close,
    Volume,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Stddev(usize),
    Rsi(usize),
    PctChange(Field),
}

impl IndicatorType {
    /// Index of the first point that can be valid.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Stddev(period) => {
                period.saturating_sub(1)
            }
            IndicatorType::Rsi(period) => *period,
            IndicatorType::PctChange(_) => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::get)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Close => write!(f, "CLOSE"),
            Field::Volume => write!(f, "VOLUME"),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::PctChange(field) => write!(f, "PCT_CHANGE({})", field),
        }
    }
}
