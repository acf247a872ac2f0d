//! CSV file quote adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a `date,open,high,low,close,volume`
//! header. Lets training and serving run without network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::ProviderError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use crate::domain::period::Period;
use crate::ports::quote_port::QuotePort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<T: FromStr>(record: &csv::StringRecord, idx: usize, name: &str) -> Result<T, ProviderError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(idx).ok_or_else(|| ProviderError::Decode {
        reason: format!("missing {} column", name),
    })?;
    raw.trim().parse().map_err(|e: T::Err| ProviderError::Decode {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

/// Volumes exported as floats (`1200.0`) are accepted and truncated.
fn volume(record: &csv::StringRecord) -> Result<i64, ProviderError> {
    field::<i64>(record, 5, "volume").or_else(|_| field::<f64>(record, 5, "volume").map(|v| v as i64))
}

pub fn parse_csv(symbol: &str, content: &str) -> Result<BarSeries, ProviderError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| ProviderError::Decode {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str: String = field(&record, 0, "date")?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            ProviderError::Decode {
                reason: format!("invalid date format: {}", e),
            }
        })?;

        bars.push(OhlcvBar {
            date,
            open: field(&record, 1, "open")?,
            high: field(&record, 2, "high")?,
            low: field(&record, 3, "low")?,
            close: field(&record, 4, "close")?,
            volume: volume(&record)?,
        });
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    BarSeries::from_unsorted(symbol, bars).map_err(|e| ProviderError::Decode {
        reason: e.to_string(),
    })
}

#[async_trait]
impl QuotePort for CsvAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch_daily(&self, symbol: &str, _period: Period) -> Result<BarSeries, ProviderError> {
        let path = self.csv_path(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProviderError::InvalidSymbol {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(ProviderError::Transport {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };
        parse_csv(symbol, &content)
    }
}
