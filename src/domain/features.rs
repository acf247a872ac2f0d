//! Feature engineering shared by training and inference.
//!
//! [`engineer_features`] is the only place bars become model inputs. The
//! training driver calls [`engineer_training_rows`], which is the same
//! table with a next-close target attached, so the two call sites cannot
//! drift apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::indicator::{Field, IndicatorType};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};

pub const MA_SHORT: usize = 5;
pub const MA_MEDIUM: usize = 10;
pub const MA_LONG: usize = 20;
pub const VOLATILITY_WINDOW: usize = 10;
pub const RSI_PERIOD: usize = 14;

/// Bars needed before the first row can be emitted.
pub const MIN_BARS: usize = MA_LONG;

const INDICATORS: [IndicatorType; 7] = [
    IndicatorType::PctChange(Field::Close),
    IndicatorType::PctChange(Field::Volume),
    IndicatorType::Sma(MA_SHORT),
    IndicatorType::Sma(MA_MEDIUM),
    IndicatorType::Sma(MA_LONG),
    IndicatorType::Stddev(VOLATILITY_WINDOW),
    IndicatorType::Rsi(RSI_PERIOD),
];

/// A model input column. The order of [`FEATURE_COLUMNS`] is the column
/// order the scalers were fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    Close,
    Volume,
    HighLowDiff,
    OpenCloseDiff,
    #[serde(rename = "ma_5")]
    Ma5,
    #[serde(rename = "ma_10")]
    Ma10,
    #[serde(rename = "ma_20")]
    Ma20,
    #[serde(rename = "volatility_10")]
    Volatility10,
    VolumeChange,
    #[serde(rename = "rsi_14")]
    Rsi14,
}

pub const FEATURE_COLUMNS: [FeatureColumn; 10] = [
    FeatureColumn::Close,
    FeatureColumn::Volume,
    FeatureColumn::HighLowDiff,
    FeatureColumn::OpenCloseDiff,
    FeatureColumn::Ma5,
    FeatureColumn::Ma10,
    FeatureColumn::Ma20,
    FeatureColumn::Volatility10,
    FeatureColumn::VolumeChange,
    FeatureColumn::Rsi14,
];

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureColumn::Close => "close",
            FeatureColumn::Volume => "volume",
            FeatureColumn::HighLowDiff => "high_low_diff",
            FeatureColumn::OpenCloseDiff => "open_close_diff",
            FeatureColumn::Ma5 => "ma_5",
            FeatureColumn::Ma10 => "ma_10",
            FeatureColumn::Ma20 => "ma_20",
            FeatureColumn::Volatility10 => "volatility_10",
            FeatureColumn::VolumeChange => "volume_change",
            FeatureColumn::Rsi14 => "rsi_14",
        };
        f.write_str(name)
    }
}

/// Derived record for one bar whose every window is full.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
    pub price_change: f64,
    pub high_low_diff: f64,
    pub open_close_diff: f64,
    pub ma_5: f64,
    pub ma_10: f64,
    pub ma_20: f64,
    pub volatility_10: f64,
    pub volume_change: f64,
    pub rsi_14: f64,
}

impl FeatureRow {
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Close => self.close,
            FeatureColumn::Volume => self.volume as f64,
            FeatureColumn::HighLowDiff => self.high_low_diff,
            FeatureColumn::OpenCloseDiff => self.open_close_diff,
            FeatureColumn::Ma5 => self.ma_5,
            FeatureColumn::Ma10 => self.ma_10,
            FeatureColumn::Ma20 => self.ma_20,
            FeatureColumn::Volatility10 => self.volatility_10,
            FeatureColumn::VolumeChange => self.volume_change,
            FeatureColumn::Rsi14 => self.rsi_14,
        }
    }

    /// Values of `columns`, in that order.
    pub fn vector(&self, columns: &[FeatureColumn]) -> Vec<f64> {
        columns.iter().map(|&c| self.value(c)).collect()
    }
}

/// Rows aligned with the tail of the source series.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub symbol: String,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }
}

/// A feature row paired with the next bar's close.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureRow,
    pub target: f64,
}

pub fn engineer_features(series: &BarSeries) -> FeatureTable {
    FeatureTable {
        symbol: series.symbol().to_string(),
        rows: feature_rows(series.bars()),
    }
}

/// Feature rows with `target = close` of the following bar. The final row
/// has no successor and is dropped.
pub fn engineer_training_rows(series: &BarSeries) -> Vec<TrainingRow> {
    let table = engineer_features(series);
    let mut rows = table.rows.into_iter().peekable();
    let mut out = Vec::new();
    while let Some(features) = rows.next() {
        if let Some(next) = rows.peek() {
            let target = next.close;
            out.push(TrainingRow { features, target });
        }
    }
    out
}

fn feature_rows(bars: &[OhlcvBar]) -> Vec<FeatureRow> {
    let indicators = compute_indicators(bars, &INDICATORS);
    let at = |ind: &IndicatorType, i: usize| indicators.get(ind).and_then(|s| s.get(i));

    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let row = FeatureRow {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                price_change: at(&IndicatorType::PctChange(Field::Close), i)?,
                high_low_diff: bar.range(),
                open_close_diff: bar.body(),
                ma_5: at(&IndicatorType::Sma(MA_SHORT), i)?,
                ma_10: at(&IndicatorType::Sma(MA_MEDIUM), i)?,
                ma_20: at(&IndicatorType::Sma(MA_LONG), i)?,
                volatility_10: at(&IndicatorType::Stddev(VOLATILITY_WINDOW), i)?,
                volume_change: at(&IndicatorType::PctChange(Field::Volume), i)?,
                rsi_14: at(&IndicatorType::Rsi(RSI_PERIOD), i)?,
            };
            is_finite(&row).then_some(row)
        })
        .collect()
}

fn is_finite(row: &FeatureRow) -> bool {
    [
        row.close,
        row.price_change,
        row.high_low_diff,
        row.open_close_diff,
        row.ma_5,
        row.ma_10,
        row.ma_20,
        row.volatility_10,
        row.volume_change,
        row.rsi_14,
    ]
    .iter()
    .all(|v| v.is_finite())
}
