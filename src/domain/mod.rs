//! Core domain types and logic.

pub mod ohlcv;
pub mod period;
pub mod indicator;
pub mod indicator_helpers;
pub mod features;
pub mod scaler;
pub mod model;
pub mod bundle;
pub mod metrics;
pub mod coordinator;
pub mod prediction;
pub mod history;
pub mod training;
pub mod settings;
pub mod service;
pub mod error;
