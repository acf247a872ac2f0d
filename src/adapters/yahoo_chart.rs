//! Yahoo Finance chart API.
//!
//! `GET /v8/finance/chart/{symbol}?range=..&interval=1d` returns parallel
//! arrays of timestamps and quote fields. Rows with a missing price are
//! skipped; a repeated trading day keeps its last row.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::error::ProviderError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::period::Period;
use crate::ports::quote_port::QuotePort;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stockcast/0.1)";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Bars and display name decoded from one chart response.
#[derive(Debug)]
pub struct ChartData {
    pub series: BarSeries,
    pub name: Option<String>,
}

pub struct YahooChartAdapter {
    client: Client,
    base_url: String,
}

impl YahooChartAdapter {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn chart(&self, symbol: &str, range: &str) -> Result<ChartData, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                message: "HTTP 429".to_string(),
            });
        }
        // Unknown symbols come back as 404 with a chart.error body.
        let body = response.text().await?;
        let payload: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                ProviderError::Decode {
                    reason: e.to_string(),
                }
            } else {
                ProviderError::Transport {
                    reason: format!("HTTP {}", status),
                }
            }
        })?;
        parse_chart_payload(payload, symbol)
    }
}

pub fn parse_chart_payload(
    payload: serde_json::Value,
    symbol: &str,
) -> Result<ChartData, ProviderError> {
    let envelope: ChartEnvelope =
        serde_json::from_value(payload).map_err(|e| ProviderError::Decode {
            reason: e.to_string(),
        })?;

    if let Some(err) = envelope.chart.error {
        let description = err.description.unwrap_or_default();
        return Err(match err.code.as_str() {
            "Not Found" => ProviderError::InvalidSymbol {
                symbol: symbol.to_string(),
            },
            "Too Many Requests" => ProviderError::RateLimited {
                message: description,
            },
            code => ProviderError::Transport {
                reason: format!("{}: {}", code, description),
            },
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NoData {
            symbol: symbol.to_string(),
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut by_date = BTreeMap::new();
    for (i, &ts) in timestamps.iter().enumerate() {
        let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open),
            at(&quote.high),
            at(&quote.low),
            at(&quote.close),
        ) else {
            continue;
        };
        let date = trading_date(ts, offset)?;
        by_date.insert(
            date,
            OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume: at(&quote.volume).unwrap_or(0.0) as i64,
            },
        );
    }

    if by_date.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let series = BarSeries::from_unsorted(symbol, by_date.into_values().collect())
        .map_err(|e| ProviderError::Decode {
            reason: e.to_string(),
        })?;

    Ok(ChartData {
        series,
        name: result.meta.long_name.or(result.meta.short_name),
    })
}

/// Exchange-local calendar date of a bar timestamp.
fn trading_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate, ProviderError> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ProviderError::Decode {
            reason: format!("timestamp {} out of range", timestamp),
        })
}

#[async_trait]
impl QuotePort for YahooChartAdapter {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily(&self, symbol: &str, period: Period) -> Result<BarSeries, ProviderError> {
        Ok(self.chart(symbol, period.as_str()).await?.series)
    }

    async fn company_name(&self, symbol: &str) -> Option<String> {
        self.chart(symbol, "5d").await.ok()?.name
    }
}
