//! Quote provider port.
//!
//! A provider returns daily bars for one symbol. Period filtering happens in
//! the coordinator, so a provider may return more history than asked for.

use async_trait::async_trait;

use crate::domain::error::ProviderError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::period::Period;

#[async_trait]
pub trait QuotePort: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    async fn fetch_daily(&self, symbol: &str, period: Period) -> Result<BarSeries, ProviderError>;

    /// Display name for `symbol`, if the provider knows one.
    async fn company_name(&self, _symbol: &str) -> Option<String> {
        None
    }
}
