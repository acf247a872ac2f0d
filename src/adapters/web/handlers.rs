//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::history::HistoricalSeries;
use crate::domain::period::Period;
use crate::domain::prediction::PredictionResult;

use super::{AppState, WebError};

const POPULAR: [(&str, &str); 10] = [
    ("AAPL", "Apple Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla, Inc."),
    ("META", "Meta Platforms Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
    ("WMT", "Walmart Inc."),
];

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub project: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        project: "stock_prediction",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    pub symbol: String,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, WebError> {
    let Json(request) = payload?;
    let result = state.service.predict(&request.symbol).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
    pub period: Option<String>,
}

/// Unknown period strings fall back to two years; a missing one uses the
/// configured chart period.
pub async fn historical(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<HistoricalSeries>, WebError> {
    let period = match query.period.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Period::parse_or_default(raw),
        _ => state.service.chart_period(),
    };
    let series = state.service.historical(&symbol, period).await?;
    Ok(Json(series))
}

#[derive(Debug, Serialize)]
pub struct PopularStock {
    pub symbol: &'static str,
    pub name: &'static str,
}

pub async fn popular() -> Json<Vec<PopularStock>> {
    Json(
        POPULAR
            .iter()
            .map(|&(symbol, name)| PopularStock { symbol, name })
            .collect(),
    )
}

pub async fn not_found() -> WebError {
    WebError::not_found("no such route")
}
