//! Concrete adapter implementations for ports.

pub mod alpha_vantage;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_model_store;
#[cfg(feature = "web")]
pub mod web;
pub mod yahoo_chart;

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::domain::coordinator::QuoteCoordinator;
use crate::domain::error::StockcastError;
use crate::domain::settings::{ProviderName, ProviderSettings};
use crate::ports::quote_port::QuotePort;

use alpha_vantage::AlphaVantageAdapter;
use csv_adapter::CsvAdapter;
use yahoo_chart::YahooChartAdapter;

pub fn build_quote_port(
    name: ProviderName,
    settings: &ProviderSettings,
) -> Result<Arc<dyn QuotePort>, StockcastError> {
    let port: Arc<dyn QuotePort> = match name {
        ProviderName::AlphaVantage => {
            let key = SecretString::new(settings.api_key.expose_secret().into());
            Arc::new(AlphaVantageAdapter::new(key, settings.timeout).map_err(|e| {
                StockcastError::config_invalid("provider", "primary", e.to_string())
            })?)
        }
        ProviderName::Yahoo => Arc::new(YahooChartAdapter::new(settings.timeout).map_err(|e| {
            StockcastError::config_invalid("provider", "fallback", e.to_string())
        })?),
        ProviderName::Csv => Arc::new(CsvAdapter::new(settings.csv_dir.clone())),
    };
    Ok(port)
}

/// Wires the configured primary and fallback providers.
pub fn build_coordinator(settings: &ProviderSettings) -> Result<QuoteCoordinator, StockcastError> {
    let primary = build_quote_port(settings.primary, settings)?;
    let fallback = build_quote_port(settings.fallback, settings)?;
    Ok(QuoteCoordinator::new(primary, fallback)
        .with_preferred(settings.mode)
        .with_timeout(settings.timeout))
}
