//! Quote retrieval with a single fallback.
//!
//! Each fetch walks `TryPreferred -> TryAlternate -> Exhausted`. Any provider
//! error moves to the next state; there is exactly one fallback attempt and
//! nothing is cached between calls.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::domain::error::{ProviderError, StockcastError};
use crate::domain::ohlcv::BarSeries;
use crate::domain::period::Period;
use crate::ports::quote_port::QuotePort;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_SYMBOL_LEN: usize = 16;

/// Which configured provider to ask first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Primary,
    Fallback,
}

impl ProviderKind {
    pub fn other(self) -> Self {
        match self {
            ProviderKind::Primary => ProviderKind::Fallback,
            ProviderKind::Fallback => ProviderKind::Primary,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    /// Accepts the role names and the legacy provider names used by
    /// `API_MODE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "alphavantage" | "alpha_vantage" => Ok(ProviderKind::Primary),
            "fallback" | "yahoo" | "yfinance" => Ok(ProviderKind::Fallback),
            other => Err(format!("unknown provider mode '{}'", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Primary => write!(f, "primary"),
            ProviderKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Trims and upper-cases a ticker, rejecting empty or malformed input.
pub fn normalize_symbol(raw: &str) -> Result<String, StockcastError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(StockcastError::InvalidRequest {
            reason: "symbol must not be empty".to_string(),
        });
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(StockcastError::InvalidRequest {
            reason: format!("symbol longer than {} characters", MAX_SYMBOL_LEN),
        });
    }
    if let Some(c) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(StockcastError::InvalidRequest {
            reason: format!("symbol contains invalid character '{}'", c),
        });
    }
    Ok(symbol)
}

enum Attempt {
    TryPreferred,
    TryAlternate { first: ProviderError },
    Exhausted { first: ProviderError, second: ProviderError },
}

pub struct QuoteCoordinator {
    primary: Arc<dyn QuotePort>,
    fallback: Arc<dyn QuotePort>,
    preferred: ProviderKind,
    timeout: Duration,
}

impl QuoteCoordinator {
    pub fn new(primary: Arc<dyn QuotePort>, fallback: Arc<dyn QuotePort>) -> Self {
        Self {
            primary,
            fallback,
            preferred: ProviderKind::Primary,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_preferred(mut self, preferred: ProviderKind) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn preferred(&self) -> ProviderKind {
        self.preferred
    }

    fn port(&self, kind: ProviderKind) -> &dyn QuotePort {
        match kind {
            ProviderKind::Primary => self.primary.as_ref(),
            ProviderKind::Fallback => self.fallback.as_ref(),
        }
    }

    /// Fetches bars using the configured preferred provider.
    pub async fn fetch(&self, symbol: &str, period: Period) -> Result<BarSeries, StockcastError> {
        self.fetch_with(symbol, period, self.preferred).await
    }

    pub async fn fetch_with(
        &self,
        symbol: &str,
        period: Period,
        preferred: ProviderKind,
    ) -> Result<BarSeries, StockcastError> {
        self.fetch_as_of(symbol, period, preferred, Local::now().date_naive())
            .await
    }

    /// Like [`Self::fetch_with`], with the period cut-off measured from `today`.
    pub async fn fetch_as_of(
        &self,
        symbol: &str,
        period: Period,
        preferred: ProviderKind,
        today: NaiveDate,
    ) -> Result<BarSeries, StockcastError> {
        let symbol = normalize_symbol(symbol)?;
        let cutoff = today - Days::new(period.days() as u64);

        let mut state = Attempt::TryPreferred;
        loop {
            state = match state {
                Attempt::TryPreferred => match self.call(preferred, &symbol, period).await {
                    Ok(series) => return Ok(series.since(cutoff)),
                    Err(first) => {
                        warn!(
                            provider = self.port(preferred).name(),
                            symbol = %symbol,
                            error = %first,
                            "provider failed, trying alternate"
                        );
                        Attempt::TryAlternate { first }
                    }
                },
                Attempt::TryAlternate { first } => {
                    let alternate = preferred.other();
                    match self.call(alternate, &symbol, period).await {
                        Ok(series) => {
                            info!(
                                provider = self.port(alternate).name(),
                                symbol = %symbol,
                                "served by alternate provider"
                            );
                            return Ok(series.since(cutoff));
                        }
                        Err(second) => Attempt::Exhausted { first, second },
                    }
                }
                Attempt::Exhausted { first, second } => {
                    warn!(symbol = %symbol, "both providers failed");
                    return Err(self.exhausted(symbol, preferred, first, second));
                }
            };
        }
    }

    async fn call(
        &self,
        kind: ProviderKind,
        symbol: &str,
        period: Period,
    ) -> Result<BarSeries, ProviderError> {
        let port = self.port(kind);
        debug!(provider = port.name(), symbol, period = %period, "fetching daily bars");
        match tokio::time::timeout(self.timeout, port.fetch_daily(symbol, period)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    fn exhausted(
        &self,
        symbol: String,
        preferred: ProviderKind,
        first: ProviderError,
        second: ProviderError,
    ) -> StockcastError {
        let both_invalid = matches!(first, ProviderError::InvalidSymbol { .. })
            && matches!(second, ProviderError::InvalidSymbol { .. });
        if both_invalid {
            return StockcastError::UnknownSymbol { symbol };
        }
        StockcastError::DataUnavailable {
            reason: format!(
                "{}: {}; {}: {}",
                self.port(preferred).name(),
                first,
                self.port(preferred.other()).name(),
                second
            ),
            symbol,
        }
    }

    /// Best-effort display name; falls back to the symbol itself.
    pub async fn company_name(&self, symbol: &str) -> String {
        for kind in [self.preferred, self.preferred.other()] {
            let lookup = self.port(kind).company_name(symbol);
            if let Ok(Some(name)) = tokio::time::timeout(self.timeout, lookup).await {
                if !name.trim().is_empty() {
                    return name;
                }
            }
        }
        symbol.to_string()
    }
}
