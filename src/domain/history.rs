//! Chart-friendly reshaping of a bar series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::prediction::round2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub data: Vec<HistoricalPoint>,
}

/// Prices rounded to cents, oldest first. An empty series has nothing to
/// chart and is reported as `DataUnavailable`.
pub fn format_series(series: &BarSeries) -> Result<HistoricalSeries, StockcastError> {
    if series.is_empty() {
        return Err(StockcastError::DataUnavailable {
            symbol: series.symbol().to_string(),
            reason: "no bars in the requested period".to_string(),
        });
    }

    let data = series
        .bars()
        .iter()
        .map(|bar| HistoricalPoint {
            date: bar.date,
            open: round2(bar.open),
            high: round2(bar.high),
            low: round2(bar.low),
            close: round2(bar.close),
            volume: bar.volume,
        })
        .collect();

    Ok(HistoricalSeries {
        symbol: series.symbol().to_string(),
        data,
    })
}
