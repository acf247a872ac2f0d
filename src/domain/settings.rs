//! Typed settings resolved from the INI config port and the environment.
//!
//! Every key is optional. Environment variables win over the file:
//! `ALPHA_VANTAGE_API_KEY`, `API_MODE` and `STOCKCAST_MODEL_PATH`.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::domain::coordinator::{ProviderKind, normalize_symbol};
use crate::domain::error::StockcastError;
use crate::domain::model::{ModelKind, ModelSpec};
use crate::domain::period::Period;
use crate::domain::training::{DEFAULT_TEST_FRACTION, TrainingPlan};
use crate::ports::config_port::ConfigPort;

pub const ENV_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const ENV_API_MODE: &str = "API_MODE";
pub const ENV_MODEL_PATH: &str = "STOCKCAST_MODEL_PATH";

pub const DEFAULT_API_KEY: &str = "demo";
pub const DEFAULT_MODEL_PATH: &str = "stock_model.json";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:5000";
pub const DEFAULT_TIMEOUT_SECS: i64 = 5;

/// A concrete quote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderName {
    AlphaVantage,
    Yahoo,
    Csv,
}

impl FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alphavantage" | "alpha_vantage" => Ok(ProviderName::AlphaVantage),
            "yahoo" | "yfinance" => Ok(ProviderName::Yahoo),
            "csv" => Ok(ProviderName::Csv),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::AlphaVantage => write!(f, "alphavantage"),
            ProviderName::Yahoo => write!(f, "yahoo"),
            ProviderName::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug)]
pub struct ProviderSettings {
    pub mode: ProviderKind,
    pub primary: ProviderName,
    pub fallback: ProviderName,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub csv_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub spec: ModelSpec,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingSettings {
    pub prediction_period: Period,
    pub chart_period: Period,
    /// Load the bundle when the server starts instead of on the first
    /// prediction.
    pub preload_model: bool,
}

#[derive(Debug)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub model: ModelSettings,
    pub training: TrainingPlan,
    pub serving: ServingSettings,
    pub listen: SocketAddr,
}

impl Settings {
    /// Resolves settings using the process environment for overrides.
    pub fn load(config: &dyn ConfigPort) -> Result<Self, StockcastError> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        config: &dyn ConfigPort,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, StockcastError> {
        let model = model_settings(config, &env)?;
        let training = training_plan(config, model.spec)?;
        Ok(Self {
            provider: provider_settings(config, &env)?,
            model,
            training,
            serving: serving_settings(config)?,
            listen: listen_addr(config)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, StockcastError>
where
    T::Err: fmt::Display,
{
    match non_empty(config.get_string(section, key)) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| StockcastError::config_invalid(section, key, e.to_string())),
    }
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, StockcastError> {
    let value: i64 = parse_key(config, section, key, default)?;
    if value <= 0 {
        return Err(StockcastError::config_invalid(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(value as usize)
}

fn provider_settings(
    config: &dyn ConfigPort,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<ProviderSettings, StockcastError> {
    let mode = match non_empty(env(ENV_API_MODE)) {
        Some(raw) => raw
            .parse()
            .map_err(|e: String| StockcastError::config_invalid("provider", "mode", e))?,
        None => parse_key(config, "provider", "mode", ProviderKind::Primary)?,
    };
    let primary = parse_key(config, "provider", "primary", ProviderName::AlphaVantage)?;
    let fallback = parse_key(config, "provider", "fallback", ProviderName::Yahoo)?;

    let api_key = non_empty(env(ENV_API_KEY))
        .or_else(|| non_empty(config.get_string("provider", "api_key")))
        .unwrap_or_else(|| DEFAULT_API_KEY.to_string());

    let timeout_secs = positive_int(config, "provider", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    let csv_dir = non_empty(config.get_string("provider", "csv_dir")).unwrap_or_else(|| "data".into());

    Ok(ProviderSettings {
        mode,
        primary,
        fallback,
        api_key: SecretString::new(api_key.into()),
        timeout: Duration::from_secs(timeout_secs as u64),
        csv_dir: PathBuf::from(csv_dir),
    })
}

fn model_settings(
    config: &dyn ConfigPort,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<ModelSettings, StockcastError> {
    let defaults = ModelSpec::default();
    let path = non_empty(env(ENV_MODEL_PATH))
        .or_else(|| non_empty(config.get_string("model", "path")))
        .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

    let kind: ModelKind = parse_key(config, "model", "kind", defaults.kind)?;
    let n_estimators = positive_int(config, "model", "n_estimators", defaults.n_estimators as i64)?;
    let max_depth = positive_int(config, "model", "max_depth", defaults.max_depth as i64)?;
    let seed: i64 = parse_key(config, "model", "seed", defaults.seed as i64)?;
    if seed < 0 {
        return Err(StockcastError::config_invalid(
            "model",
            "seed",
            "seed must be non-negative",
        ));
    }
    let ridge_alpha: f64 = parse_key(config, "model", "ridge_alpha", defaults.ridge_alpha)?;
    if !(ridge_alpha >= 0.0 && ridge_alpha.is_finite()) {
        return Err(StockcastError::config_invalid(
            "model",
            "ridge_alpha",
            "ridge_alpha must be a non-negative number",
        ));
    }

    Ok(ModelSettings {
        path: PathBuf::from(path),
        spec: ModelSpec {
            kind,
            n_estimators,
            max_depth,
            seed: seed as u64,
            ridge_alpha,
        },
    })
}

/// Parses a comma-separated symbol list.
pub fn parse_symbols(raw: &str) -> Result<Vec<String>, StockcastError> {
    let symbols = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(normalize_symbol)
        .collect::<Result<Vec<_>, _>>()?;
    if symbols.is_empty() {
        return Err(StockcastError::InvalidRequest {
            reason: "no symbols given".to_string(),
        });
    }
    Ok(symbols)
}

fn training_plan(config: &dyn ConfigPort, model: ModelSpec) -> Result<TrainingPlan, StockcastError> {
    let defaults = TrainingPlan::default();
    let symbols = match non_empty(config.get_string("training", "symbols")) {
        Some(raw) => parse_symbols(&raw).map_err(|e| {
            StockcastError::config_invalid("training", "symbols", e.to_string())
        })?,
        None => defaults.symbols,
    };
    let period = parse_key(config, "training", "period", defaults.period)?;
    let test_fraction: f64 =
        parse_key(config, "training", "test_fraction", DEFAULT_TEST_FRACTION)?;
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(StockcastError::config_invalid(
            "training",
            "test_fraction",
            "test_fraction must be between 0 and 1 exclusive",
        ));
    }

    Ok(TrainingPlan {
        symbols,
        period,
        test_fraction,
        model,
    })
}

fn serving_settings(config: &dyn ConfigPort) -> Result<ServingSettings, StockcastError> {
    Ok(ServingSettings {
        prediction_period: parse_key(config, "serving", "prediction_period", Period::ThreeMonths)?,
        chart_period: parse_key(config, "serving", "chart_period", Period::OneMonth)?,
        preload_model: config
            .get_bool("serving", "preload_model")
            .map_err(|e| StockcastError::config_invalid("serving", "preload_model", e))?
            .unwrap_or(false),
    })
}

fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, StockcastError> {
    let raw = non_empty(config.get_string("web", "listen")).unwrap_or_else(|| DEFAULT_LISTEN.into());
    raw.parse()
        .map_err(|e: std::net::AddrParseError| StockcastError::config_invalid("web", "listen", e.to_string()))
}
