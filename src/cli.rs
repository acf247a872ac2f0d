//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::build_coordinator;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_model_store::JsonModelStore;
use crate::domain::error::StockcastError;
use crate::domain::period::Period;
use crate::domain::service::ForecastService;
use crate::domain::settings::{Settings, parse_symbols};
use crate::domain::training::{self, TrainingPlan, TrainingReport};
use crate::ports::model_port::ModelStore;

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Next-day stock price forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train a model bundle from historical quotes
    Train {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated symbols, replacing [training] symbols
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        period: Option<String>,
        /// Bundle destination, replacing [model] path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Forecast the next close for a symbol
    Predict {
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print daily bars for a symbol
    History {
        symbol: String,
        #[arg(long)]
        period: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: ignoring .env: {e}");
        }
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(dispatch(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

async fn dispatch(command: Command) -> Result<(), StockcastError> {
    match command {
        Command::Train {
            config,
            symbols,
            period,
            output,
        } => {
            run_train(
                config.as_deref(),
                symbols.as_deref(),
                period.as_deref(),
                output,
            )
            .await
        }
        Command::Predict { symbol, config } => run_predict(&symbol, config.as_deref()).await,
        Command::History {
            symbol,
            period,
            config,
        } => run_history(&symbol, period.as_deref(), config.as_deref()).await,
        Command::Serve { config } => run_serve(config.as_deref()).await,
    }
}

/// Resolves settings from an optional INI file plus the environment.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, StockcastError> {
    if let Some(path) = config_path {
        eprintln!("Loading config from {}", path.display());
    }
    let config = FileConfigAdapter::from_optional(config_path)?;
    Settings::load(&config)
}

/// Strict period parsing for command-line input.
pub fn parse_period(raw: &str) -> Result<Period, StockcastError> {
    raw.parse().map_err(|e: crate::domain::period::UnknownPeriod| {
        StockcastError::InvalidRequest {
            reason: e.to_string(),
        }
    })
}

/// Applies `--symbols` and `--period` on top of the configured plan.
pub fn resolve_plan(
    mut plan: TrainingPlan,
    symbols: Option<&str>,
    period: Option<&str>,
) -> Result<TrainingPlan, StockcastError> {
    if let Some(raw) = symbols {
        plan.symbols = parse_symbols(raw)?;
    }
    if let Some(raw) = period {
        plan.period = parse_period(raw)?;
    }
    Ok(plan)
}

fn build_service(settings: &Settings) -> Result<ForecastService, StockcastError> {
    let coordinator = build_coordinator(&settings.provider)?;
    let store = Arc::new(JsonModelStore::new(settings.model.path.clone()));
    Ok(ForecastService::new(coordinator, store).with_periods(
        settings.serving.prediction_period,
        settings.serving.chart_period,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), StockcastError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

async fn run_train(
    config_path: Option<&Path>,
    symbols: Option<&str>,
    period: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), StockcastError> {
    let settings = load_settings(config_path)?;
    let plan = resolve_plan(settings.training.clone(), symbols, period)?;
    let store = JsonModelStore::new(output.unwrap_or_else(|| settings.model.path.clone()));
    let coordinator = build_coordinator(&settings.provider)?;

    eprintln!(
        "Training {} on {} symbols over {}...",
        plan.model.kind,
        plan.symbols.len(),
        plan.period
    );
    let outcome = training::train(&coordinator, &plan).await?;
    store.save(&outcome.bundle)?;

    print_summary(&outcome.report);
    eprintln!("Model saved to {}", store.location());
    print_json(&outcome.report)
}

fn print_summary(report: &TrainingReport) {
    for skipped in &report.skipped {
        eprintln!("  skipped {}: {}", skipped.symbol, skipped.reason);
    }
    eprintln!(
        "Trained on {} rows, held out {} rows",
        report.train_rows, report.test_rows
    );
    if let Some(holdout) = &report.holdout {
        eprintln!("Holdout MSE: {:.6}  R2: {:.4}", holdout.mse, holdout.r2);
    }
}

async fn run_predict(symbol: &str, config_path: Option<&Path>) -> Result<(), StockcastError> {
    let settings = load_settings(config_path)?;
    let service = build_service(&settings)?;
    let prediction = service.predict(symbol).await?;
    print_json(&prediction)
}

async fn run_history(
    symbol: &str,
    period: Option<&str>,
    config_path: Option<&Path>,
) -> Result<(), StockcastError> {
    let settings = load_settings(config_path)?;
    let period = match period {
        Some(raw) => parse_period(raw)?,
        None => settings.serving.chart_period,
    };
    let service = build_service(&settings)?;
    let series = service.historical(symbol, period).await?;
    print_json(&series)
}

#[cfg(feature = "web")]
async fn run_serve(config_path: Option<&Path>) -> Result<(), StockcastError> {
    use crate::adapters::web::{AppState, build_router};
    use tracing::{info, warn};

    let settings = load_settings(config_path)?;
    let service = build_service(&settings)?;
    if settings.serving.preload_model {
        // a missing bundle is retried on the first prediction
        if let Err(e) = service.bundle().await {
            warn!(error = %e, "model preload failed");
        }
    }
    let router = build_router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    info!(listen = %settings.listen, "server started");
    eprintln!("Starting web server on {}", settings.listen);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(not(feature = "web"))]
async fn run_serve(_config_path: Option<&Path>) -> Result<(), StockcastError> {
    Err(StockcastError::InvalidRequest {
        reason: "web feature is required for serve".to_string(),
    })
}
