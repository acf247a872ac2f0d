//! Serving context shared by every request.
//!
//! Built once at start-up and handed to the handlers. The model bundle is
//! read from the store on first use and cached for the life of the service;
//! concurrent first callers wait on a single load.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::bundle::ModelBundle;
use crate::domain::coordinator::{QuoteCoordinator, normalize_symbol};
use crate::domain::error::StockcastError;
use crate::domain::history::{HistoricalSeries, format_series};
use crate::domain::period::Period;
use crate::domain::prediction::{PredictionResult, forecast};
use crate::ports::model_port::ModelStore;

pub struct ForecastService {
    coordinator: QuoteCoordinator,
    store: Arc<dyn ModelStore>,
    bundle: OnceCell<Arc<ModelBundle>>,
    prediction_period: Period,
    chart_period: Period,
}

impl ForecastService {
    pub fn new(coordinator: QuoteCoordinator, store: Arc<dyn ModelStore>) -> Self {
        Self {
            coordinator,
            store,
            bundle: OnceCell::new(),
            prediction_period: Period::ThreeMonths,
            chart_period: Period::OneMonth,
        }
    }

    pub fn with_periods(mut self, prediction: Period, chart: Period) -> Self {
        self.prediction_period = prediction;
        self.chart_period = chart;
        self
    }

    pub fn chart_period(&self) -> Period {
        self.chart_period
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.initialized()
    }

    /// The cached bundle, loading and validating it on first call. A failed
    /// load is not cached, so a later call retries.
    ///
    /// Store reads are blocking file IO and run on the blocking pool.
    pub async fn bundle(&self) -> Result<Arc<ModelBundle>, StockcastError> {
        self.bundle
            .get_or_try_init(|| async {
                let store = Arc::clone(&self.store);
                let bundle = tokio::task::spawn_blocking(move || {
                    let bundle = store.load()?;
                    bundle.validate()?;
                    Ok::<_, StockcastError>(bundle)
                })
                .await
                .map_err(|e| StockcastError::ModelNotLoaded {
                    path: self.store.location(),
                    reason: e.to_string(),
                })??;
                info!(location = %self.store.location(), "model bundle loaded");
                Ok(Arc::new(bundle))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn predict(&self, symbol: &str) -> Result<PredictionResult, StockcastError> {
        let symbol = normalize_symbol(symbol)?;
        let series = self.coordinator.fetch(&symbol, self.prediction_period).await?;
        let bundle = self.bundle().await?;
        let forecast = forecast(&series, &bundle)?;
        let company_name = self.coordinator.company_name(&symbol).await;
        info!(
            symbol = %symbol,
            current = forecast.current_price,
            predicted = forecast.predicted_price,
            "prediction"
        );
        Ok(PredictionResult::new(
            symbol,
            company_name,
            &forecast,
            Local::now().date_naive(),
        ))
    }

    pub async fn historical(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<HistoricalSeries, StockcastError> {
        let series = self.coordinator.fetch(symbol, period).await?;
        format_series(&series)
    }
}
