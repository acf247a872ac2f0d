#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use stockcast::domain::bundle::ModelBundle;
use stockcast::domain::error::{ProviderError, StockcastError};
use stockcast::domain::features::FEATURE_COLUMNS;
use stockcast::domain::model::Model;
use stockcast::domain::model::linear::LinearModel;
pub use stockcast::domain::ohlcv::{BarSeries, OhlcvBar};
use stockcast::domain::period::Period;
use stockcast::domain::scaler::MinMaxScaler;
use stockcast::ports::model_port::ModelStore;
use stockcast::ports::quote_port::QuotePort;

/// Quote provider answering from in-memory bars. Unknown symbols fail as
/// `InvalidSymbol`.
pub struct MockQuotePort {
    pub name: &'static str,
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, ProviderError>,
    pub companies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockQuotePort {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            data: HashMap::new(),
            errors: HashMap::new(),
            companies: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, err: ProviderError) -> Self {
        self.errors.insert(symbol.to_string(), err);
        self
    }

    pub fn with_company(mut self, symbol: &str, name: &str) -> Self {
        self.companies.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotePort for MockQuotePort {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_daily(&self, symbol: &str, _period: Period) -> Result<BarSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.errors.get(symbol) {
            return Err(err.clone());
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(BarSeries::from_unsorted(symbol, bars.clone())
                .expect("mock bars have unique dates")),
            None => Err(ProviderError::InvalidSymbol {
                symbol: symbol.to_string(),
            }),
        }
    }

    async fn company_name(&self, symbol: &str) -> Option<String> {
        self.companies.get(symbol).cloned()
    }
}

/// Model store backed by memory; counts loads.
#[derive(Default)]
pub struct MemoryModelStore {
    bundle: Mutex<Option<ModelBundle>>,
    loads: AtomicUsize,
}

impl MemoryModelStore {
    pub fn with_bundle(bundle: ModelBundle) -> Self {
        Self {
            bundle: Mutex::new(Some(bundle)),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<ModelBundle> {
        self.bundle.lock().unwrap().clone()
    }
}

impl ModelStore for MemoryModelStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<ModelBundle, StockcastError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.bundle
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| StockcastError::ModelNotLoaded {
                path: "memory".to_string(),
                reason: "no bundle stored".to_string(),
            })
    }

    fn save(&self, bundle: &ModelBundle) -> Result<(), StockcastError> {
        *self.bundle.lock().unwrap() = Some(bundle.clone());
        Ok(())
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `n` consecutive daily bars ending today, trending by `step` with a small
/// three-day wobble so gains and losses both occur.
pub fn generate_bars(n: usize, start: f64, step: f64) -> Vec<OhlcvBar> {
    let first = today() - Days::new(n.saturating_sub(1) as u64);
    (0..n)
        .map(|i| {
            let close = start + step * i as f64 + (i % 3) as f64 - 1.0;
            OhlcvBar {
                date: first + Days::new(i as u64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.5,
                close,
                volume: 1_000_000 + 1_000 * i as i64,
            }
        })
        .collect()
}

pub fn flat_bars(n: usize, price: f64) -> Vec<OhlcvBar> {
    let first = today() - Days::new(n.saturating_sub(1) as u64);
    (0..n)
        .map(|i| OhlcvBar {
            date: first + Days::new(i as u64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000,
        })
        .collect()
}

/// Bundle whose prediction equals the last close.
pub fn close_identity_bundle() -> ModelBundle {
    let width = FEATURE_COLUMNS.len();
    let mut coefficients = vec![0.0; width];
    coefficients[0] = 1.0;
    let mut lo = vec![0.0; width];
    let mut hi = vec![1.0; width];
    lo[0] = 100.0;
    hi[0] = 200.0;
    ModelBundle {
        model: Model::Linear(LinearModel {
            intercept: 0.0,
            coefficients,
        }),
        scaler_x: MinMaxScaler::fit(&[lo, hi]).unwrap(),
        scaler_y: MinMaxScaler::fit_column(&[100.0, 200.0]).unwrap(),
        feature_cols: FEATURE_COLUMNS.to_vec(),
    }
}
