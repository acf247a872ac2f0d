//! Next-close prediction from the latest feature row.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::bundle::ModelBundle;
use crate::domain::error::StockcastError;
use crate::domain::features::{MIN_BARS, engineer_features};
use crate::domain::ohlcv::BarSeries;

/// Rounds to two decimal places, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Unrounded prediction for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub current_price: f64,
    pub predicted_price: f64,
    pub last_updated: NaiveDate,
}

impl Forecast {
    pub fn price_change(&self) -> f64 {
        self.predicted_price - self.current_price
    }

    /// Change relative to the current price, in percent. Zero when the
    /// current price is zero.
    pub fn percent_change(&self) -> f64 {
        if self.current_price == 0.0 {
            return 0.0;
        }
        self.price_change() / self.current_price * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change: f64,
    pub percent_change: f64,
    pub prediction_date: NaiveDate,
    pub last_updated: NaiveDate,
}

impl PredictionResult {
    pub fn new(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        forecast: &Forecast,
        today: NaiveDate,
    ) -> Self {
        // percent follows the rounded change so the two never disagree in sign
        let price_change = round2(forecast.price_change());
        let percent_change = if forecast.current_price == 0.0 {
            0.0
        } else {
            round2(price_change / forecast.current_price * 100.0)
        };
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            current_price: round2(forecast.current_price),
            predicted_price: round2(forecast.predicted_price),
            price_change,
            percent_change,
            prediction_date: today + Duration::days(1),
            last_updated: forecast.last_updated,
        }
    }
}

/// Runs the bundle on the last feature row of `series`.
///
/// Fails with `InsufficientData` when the series is too short to produce a
/// single feature row.
pub fn forecast(series: &BarSeries, bundle: &ModelBundle) -> Result<Forecast, StockcastError> {
    let table = engineer_features(series);
    let Some(row) = table.last() else {
        return Err(StockcastError::InsufficientData {
            symbol: series.symbol().to_string(),
            bars: series.len(),
            minimum: MIN_BARS,
        });
    };

    Ok(Forecast {
        current_price: row.close,
        predicted_price: bundle.predict_row(row)?,
        last_updated: row.date,
    })
}
