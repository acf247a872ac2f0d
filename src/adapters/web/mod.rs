//! Web server adapter.
//!
//! JSON API over axum. Handlers share one [`ForecastService`] through
//! [`AppState`]; CORS is open so a browser frontend on another origin can
//! call it.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::domain::service::ForecastService;

pub struct AppState {
    pub service: Arc<ForecastService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/predict", post(handlers::predict))
        .route("/api/historical/{symbol}", get(handlers::historical))
        .route("/api/stocks/popular", get(handlers::popular))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
