//! Domain error types.
//!
//! Two layers: [`ProviderError`] is what a single quote provider reports and
//! never escapes the coordinator; [`StockcastError`] is what every core
//! operation surfaces to the CLI and the web layer.

/// Failure of one quote provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("no time series returned for {symbol}")]
    NoData { symbol: String },

    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed response: {reason}")]
    Decode { reason: String },
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { seconds: 0 }
        } else if err.is_decode() {
            ProviderError::Decode {
                reason: err.to_string(),
            }
        } else {
            ProviderError::Transport {
                reason: err.to_string(),
            }
        }
    }
}

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("model not loaded from {path}: {reason}")]
    ModelNotLoaded { path: String, reason: String },

    #[error("invalid model: {reason}")]
    ModelInvalid { reason: String },

    #[error("no trainable data: all {attempted} symbols failed")]
    NoTrainableData { attempted: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockcastError {
    /// Stable machine-readable identifier for the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            StockcastError::InvalidRequest { .. } => "invalid_request",
            StockcastError::UnknownSymbol { .. } => "unknown_symbol",
            StockcastError::DataUnavailable { .. } => "data_unavailable",
            StockcastError::InsufficientData { .. } => "insufficient_data",
            StockcastError::ModelNotLoaded { .. } => "model_not_loaded",
            StockcastError::ModelInvalid { .. } => "model_invalid",
            StockcastError::NoTrainableData { .. } => "no_trainable_data",
            StockcastError::ConfigParse { .. } | StockcastError::ConfigInvalid { .. } => {
                "config_error"
            }
            StockcastError::Io(_) => "io_error",
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockcastError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. } | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::ModelNotLoaded { .. } | StockcastError::ModelInvalid { .. } => 3,
            StockcastError::InvalidRequest { .. } | StockcastError::UnknownSymbol { .. } => 4,
            StockcastError::DataUnavailable { .. }
            | StockcastError::InsufficientData { .. }
            | StockcastError::NoTrainableData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
