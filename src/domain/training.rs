//! Offline training driver.
//!
//! Each symbol is fetched and engineered on its own and split
//! chronologically. Training rows from every symbol are pooled to fit the
//! scalers and the model; holdout rows are pooled too and scored once,
//! alongside a per-symbol score. A symbol that fails is logged and skipped.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::bundle::ModelBundle;
use crate::domain::coordinator::QuoteCoordinator;
use crate::domain::error::StockcastError;
use crate::domain::features::{FEATURE_COLUMNS, MIN_BARS, TrainingRow, engineer_training_rows};
use crate::domain::metrics::RegressionMetrics;
use crate::domain::model::{ModelSpec, Regressor};
use crate::domain::period::Period;
use crate::domain::scaler::MinMaxScaler;

pub const DEFAULT_SYMBOLS: [&str; 4] = ["AAPL", "GOOGL", "MSFT", "AMZN"];
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPlan {
    pub symbols: Vec<String>,
    pub period: Period,
    pub test_fraction: f64,
    pub model: ModelSpec,
}

impl Default for TrainingPlan {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            period: Period::TwoYears,
            test_fraction: DEFAULT_TEST_FRACTION,
            model: ModelSpec::default(),
        }
    }
}

/// Target-bearing rows for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDataset {
    pub symbol: String,
    pub rows: Vec<TrainingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub holdout: Option<RegressionMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub symbols: Vec<SymbolReport>,
    pub skipped: Vec<SkippedSymbol>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Scored in scaled target space over every symbol's holdout.
    pub holdout: Option<RegressionMetrics>,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ModelBundle,
    pub report: TrainingReport,
}

/// Number of leading rows that go to training.
pub fn split_index(rows: usize, test_fraction: f64) -> usize {
    ((rows as f64) * (1.0 - test_fraction)).floor() as usize
}

pub async fn train(
    coordinator: &QuoteCoordinator,
    plan: &TrainingPlan,
) -> Result<TrainingOutcome, StockcastError> {
    check_fraction(plan.test_fraction)?;

    let mut datasets = Vec::new();
    let mut skipped = Vec::new();

    for symbol in &plan.symbols {
        info!(symbol = %symbol, period = %plan.period, "collecting training data");
        match collect(coordinator, symbol, plan).await {
            Ok(dataset) => {
                info!(symbol = %dataset.symbol, rows = dataset.rows.len(), "symbol ready");
                datasets.push(dataset);
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if datasets.is_empty() {
        return Err(StockcastError::NoTrainableData {
            attempted: plan.symbols.len(),
        });
    }

    let mut outcome = fit_datasets(&datasets, plan.test_fraction, &plan.model)?;
    outcome.report.skipped = skipped;
    Ok(outcome)
}

async fn collect(
    coordinator: &QuoteCoordinator,
    symbol: &str,
    plan: &TrainingPlan,
) -> Result<SymbolDataset, StockcastError> {
    let series = coordinator.fetch(symbol, plan.period).await?;
    let rows = engineer_training_rows(&series);
    if split_index(rows.len(), plan.test_fraction) == 0 {
        return Err(StockcastError::InsufficientData {
            symbol: series.symbol().to_string(),
            bars: series.len(),
            minimum: MIN_BARS + 1,
        });
    }
    Ok(SymbolDataset {
        symbol: series.symbol().to_string(),
        rows,
    })
}

fn check_fraction(test_fraction: f64) -> Result<(), StockcastError> {
    if test_fraction > 0.0 && test_fraction < 1.0 {
        Ok(())
    } else {
        Err(StockcastError::InvalidRequest {
            reason: format!("test fraction must be in (0, 1), got {}", test_fraction),
        })
    }
}

/// Fits scalers and model on the pooled training split of `datasets`.
pub fn fit_datasets(
    datasets: &[SymbolDataset],
    test_fraction: f64,
    spec: &ModelSpec,
) -> Result<TrainingOutcome, StockcastError> {
    check_fraction(test_fraction)?;

    let mut train_x = Vec::new();
    let mut train_y = Vec::new();
    let mut holdouts = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        let split = split_index(dataset.rows.len(), test_fraction);
        let (train, test) = dataset.rows.split_at(split);
        for row in train {
            train_x.push(row.features.vector(&FEATURE_COLUMNS));
            train_y.push(row.target);
        }
        holdouts.push((dataset.symbol.as_str(), train.len(), test));
    }

    let no_data = || StockcastError::NoTrainableData {
        attempted: datasets.len(),
    };
    let scaler_x = MinMaxScaler::fit(&train_x).ok_or_else(no_data)?;
    let scaler_y = MinMaxScaler::fit_column(&train_y).ok_or_else(no_data)?;

    let scaled_x: Vec<Vec<f64>> = train_x.iter().map(|r| scaler_x.transform(r)).collect();
    let scaled_y: Vec<f64> = train_y.iter().map(|&y| scaler_y.transform_value(y)).collect();

    info!(
        rows = scaled_x.len(),
        model = %spec.kind,
        "fitting model on pooled training rows"
    );
    let model = spec.fit(&scaled_x, &scaled_y)?;

    let bundle = ModelBundle {
        model,
        scaler_x,
        scaler_y,
        feature_cols: FEATURE_COLUMNS.to_vec(),
    };

    let mut pooled_actual = Vec::new();
    let mut pooled_predicted = Vec::new();
    let mut symbols = Vec::with_capacity(holdouts.len());

    for (symbol, train_rows, test) in holdouts {
        let (actual, predicted) = score(&bundle, test);
        let holdout = RegressionMetrics::compute(&actual, &predicted);
        if let Some(m) = &holdout {
            info!(symbol, mse = m.mse, r2 = m.r2, samples = m.samples, "holdout");
        }
        pooled_actual.extend(actual);
        pooled_predicted.extend(predicted);
        symbols.push(SymbolReport {
            symbol: symbol.to_string(),
            train_rows,
            test_rows: test.len(),
            holdout,
        });
    }

    let holdout = RegressionMetrics::compute(&pooled_actual, &pooled_predicted);
    if let Some(m) = &holdout {
        info!(mse = m.mse, r2 = m.r2, samples = m.samples, "pooled holdout");
    }

    Ok(TrainingOutcome {
        report: TrainingReport {
            symbols,
            skipped: Vec::new(),
            train_rows: scaled_y.len(),
            test_rows: pooled_actual.len(),
            holdout,
        },
        bundle,
    })
}

/// Scaled actual and predicted targets for `rows`.
fn score(bundle: &ModelBundle, rows: &[TrainingRow]) -> (Vec<f64>, Vec<f64>) {
    rows.iter()
        .map(|row| {
            let x = bundle
                .scaler_x
                .transform(&row.features.vector(&bundle.feature_cols));
            (
                bundle.scaler_y.transform_value(row.target),
                bundle.model.predict(&x),
            )
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::engineer_training_rows;
    use crate::domain::model::ModelKind;
    use crate::domain::ohlcv::{BarSeries, OhlcvBar};
    use chrono::{Duration, NaiveDate};

    fn dataset(symbol: &str, n: usize, base: f64) -> SymbolDataset {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = base + i as f64 + (i % 3) as f64 * 0.5;
                OhlcvBar {
                    date: start + Duration::days(i as i64),
                    open: close - 0.25,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000 + (i as i64 % 7) * 10,
                }
            })
            .collect();
        let series = BarSeries::from_unsorted(symbol, bars).unwrap();
        SymbolDataset {
            symbol: symbol.to_string(),
            rows: engineer_training_rows(&series),
        }
    }

    fn linear_spec() -> ModelSpec {
        ModelSpec {
            kind: ModelKind::Linear,
            ridge_alpha: 1e-3,
            ..ModelSpec::default()
        }
    }

    #[test]
    fn split_index_matches_truncation() {
        assert_eq!(split_index(100, 0.2), 80);
        assert_eq!(split_index(11, 0.2), 8);
        assert_eq!(split_index(1, 0.2), 0);
        assert_eq!(split_index(0, 0.2), 0);
    }

    #[test]
    fn pooled_and_per_symbol_holdouts() {
        let sets = vec![dataset("AAPL", 80, 100.0), dataset("MSFT", 60, 300.0)];
        let outcome = fit_datasets(&sets, 0.2, &linear_spec()).unwrap();
        let report = &outcome.report;

        // 80 bars -> 60 rows -> 48/12; 60 bars -> 40 rows -> 32/8
        assert_eq!(report.symbols[0].train_rows, 48);
        assert_eq!(report.symbols[0].test_rows, 12);
        assert_eq!(report.symbols[1].train_rows, 32);
        assert_eq!(report.symbols[1].test_rows, 8);
        assert_eq!(report.train_rows, 80);
        assert_eq!(report.test_rows, 20);
        assert_eq!(report.holdout.unwrap().samples, 20);
        assert!(report.symbols.iter().all(|s| s.holdout.is_some()));

        outcome.bundle.validate().unwrap();
    }

    #[test]
    fn scalers_fit_on_training_rows_only() {
        let sets = vec![dataset("AAPL", 45, 100.0)];
        let outcome = fit_datasets(&sets, 0.2, &linear_spec()).unwrap();
        let train_max_target = sets[0].rows[..split_index(sets[0].rows.len(), 0.2)]
            .iter()
            .map(|r| r.target)
            .fold(f64::NEG_INFINITY, f64::max);
        let (min, range) = outcome.bundle.scaler_y.params()[0];
        assert!((min + range - train_max_target).abs() < 1e-9);
    }

    #[test]
    fn linear_fit_tracks_trend() {
        let sets = vec![dataset("AAPL", 120, 100.0)];
        let outcome = fit_datasets(&sets, 0.2, &linear_spec()).unwrap();
        let holdout = outcome.report.holdout.unwrap();
        assert!(holdout.mse.is_finite());
        assert!(holdout.mse < 0.05, "mse {}", holdout.mse);
    }

    #[test]
    fn bad_fraction_rejected() {
        let sets = vec![dataset("AAPL", 40, 100.0)];
        assert!(fit_datasets(&sets, 0.0, &linear_spec()).is_err());
        assert!(fit_datasets(&sets, 1.0, &linear_spec()).is_err());
    }

    #[test]
    fn empty_datasets_have_nothing_to_fit() {
        let err = fit_datasets(&[], 0.2, &linear_spec()).unwrap_err();
        assert_eq!(err.kind(), "no_trainable_data");
    }
}
