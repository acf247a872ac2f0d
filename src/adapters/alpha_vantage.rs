//! Alpha Vantage daily time series over HTTP.
//!
//! Errors arrive as HTTP 200 with a sentinel key instead of the series:
//! `"Error Message"` for an unknown symbol, `"Note"` or `"Information"` when
//! the call quota is exhausted.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::domain::error::ProviderError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::period::Period;
use crate::ports::quote_port::QuotePort;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Compact responses hold the latest 100 trading days.
const COMPACT_MAX_DAYS: i64 = 100;

pub struct AlphaVantageAdapter {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl AlphaVantageAdapter {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.expose_secret())])
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited {
                message: "HTTP 429".to_string(),
            }),
            status if !status.is_success() => Err(ProviderError::Transport {
                reason: format!("HTTP {}", status),
            }),
            _ => Ok(response.json::<Value>().await?),
        }
    }
}

fn outputsize(period: Period) -> &'static str {
    // calendar days always exceed trading days
    if period.days() <= COMPACT_MAX_DAYS {
        "compact"
    } else {
        "full"
    }
}

fn check_sentinels(payload: &Value, symbol: &str) -> Result<(), ProviderError> {
    if payload.get("Error Message").is_some() {
        return Err(ProviderError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    for key in ["Note", "Information"] {
        if let Some(note) = payload.get(key) {
            return Err(ProviderError::RateLimited {
                message: note.as_str().unwrap_or(key).to_string(),
            });
        }
    }
    Ok(())
}

fn number<T: std::str::FromStr>(
    entry: &Map<String, Value>,
    key: &str,
    date: &str,
) -> Result<T, ProviderError> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ProviderError::Decode {
            reason: format!("missing or invalid '{}' on {}", key, date),
        })
}

/// Converts a `TIME_SERIES_DAILY` payload into a series.
pub fn parse_daily_payload(payload: &Value, symbol: &str) -> Result<BarSeries, ProviderError> {
    check_sentinels(payload, symbol)?;

    let series = payload
        .as_object()
        .and_then(|obj| {
            obj.iter()
                .find(|(key, _)| key.starts_with("Time Series"))
                .and_then(|(_, v)| v.as_object())
        })
        .filter(|series| !series.is_empty())
        .ok_or_else(|| ProviderError::NoData {
            symbol: symbol.to_string(),
        })?;

    let mut bars = Vec::with_capacity(series.len());
    for (date_str, entry) in series {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            ProviderError::Decode {
                reason: format!("invalid date '{}': {}", date_str, e),
            }
        })?;
        let entry = entry.as_object().ok_or_else(|| ProviderError::Decode {
            reason: format!("entry for {} is not an object", date_str),
        })?;
        let volume: f64 = number(entry, "5. volume", date_str)?;
        bars.push(OhlcvBar {
            date,
            open: number(entry, "1. open", date_str)?,
            high: number(entry, "2. high", date_str)?,
            low: number(entry, "3. low", date_str)?,
            close: number(entry, "4. close", date_str)?,
            volume: volume as i64,
        });
    }

    BarSeries::from_unsorted(symbol, bars).map_err(|e| ProviderError::Decode {
        reason: e.to_string(),
    })
}

#[async_trait]
impl QuotePort for AlphaVantageAdapter {
    fn name(&self) -> &str {
        "alphavantage"
    }

    async fn fetch_daily(&self, symbol: &str, period: Period) -> Result<BarSeries, ProviderError> {
        let payload = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", outputsize(period)),
            ])
            .await?;
        parse_daily_payload(&payload, symbol)
    }

    async fn company_name(&self, symbol: &str) -> Option<String> {
        let payload = self
            .query(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await
            .ok()?;
        payload
            .get("Name")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
