#![cfg(feature = "web")]
//! Router tests driving the JSON API through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use stockcast::adapters::web::{AppState, build_router};
use stockcast::domain::coordinator::QuoteCoordinator;
use stockcast::domain::service::ForecastService;
use tower::ServiceExt;

use common::*;

fn create_test_app(store: MemoryModelStore) -> Router {
    let primary = MockQuotePort::new("primary")
        .with_bars("AAPL", generate_bars(60, 150.0, 0.5))
        .with_bars("SHORT", generate_bars(5, 10.0, 0.1))
        .with_company("AAPL", "Apple Inc.");
    let fallback = MockQuotePort::new("fallback").with_bars("MSFT", generate_bars(400, 300.0, 0.1));
    let coordinator = QuoteCoordinator::new(Arc::new(primary), Arc::new(fallback));
    let service = ForecastService::new(coordinator, Arc::new(store));
    build_router(AppState {
        service: Arc::new(service),
    })
}

fn app() -> Router {
    create_test_app(MemoryModelStore::with_bundle(close_identity_bundle()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "project": "stock_prediction"}));
}

#[tokio::test]
async fn popular_lists_ten_stocks() {
    let (status, body) = send(app(), get("/api/stocks/popular")).await;
    assert_eq!(status, StatusCode::OK);
    let stocks = body.as_array().unwrap();
    assert_eq!(stocks.len(), 10);
    assert_eq!(stocks[0], json!({"symbol": "AAPL", "name": "Apple Inc."}));
    assert_eq!(stocks[9]["symbol"], "WMT");
}

#[tokio::test]
async fn predict_returns_prediction() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"symbol": "aapl"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["company_name"], "Apple Inc.");
    for key in [
        "current_price",
        "predicted_price",
        "price_change",
        "percent_change",
    ] {
        assert!(body[key].is_f64(), "{key} should be a number");
    }
    let tomorrow = (today() + chrono::Days::new(1)).format("%Y-%m-%d").to_string();
    assert_eq!(body["prediction_date"], tomorrow);
    assert_eq!(body["last_updated"], today().format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn predict_rejects_unknown_fields() {
    let (status, body) = send(
        app(),
        post_json("/api/predict", json!({"symbol": "AAPL", "days": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn predict_requires_symbol() {
    let (status, body) = send(app(), post_json("/api/predict", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, _) = send(app(), post_json("/api/predict", json!({"symbol": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_unknown_symbol_is_404() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"symbol": "ZZZZ"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown_symbol");
    assert!(body["message"].as_str().unwrap().contains("ZZZZ"));
}

#[tokio::test]
async fn predict_short_history_is_422() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"symbol": "SHORT"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_data");
}

#[tokio::test]
async fn predict_without_model_is_503() {
    let app = create_test_app(MemoryModelStore::default());
    let (status, body) = send(app, post_json("/api/predict", json!({"symbol": "AAPL"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "model_not_loaded");
}

#[tokio::test]
async fn historical_defaults_to_one_month() {
    let (status, body) = send(app(), get("/api/historical/msft")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "MSFT");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 31);
    let first = &data[0];
    for key in ["date", "open", "high", "low", "close", "volume"] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn historical_honours_period() {
    let (status, body) = send(app(), get("/api/historical/MSFT?period=1y")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 366);
}

#[tokio::test]
async fn historical_unknown_period_uses_two_years() {
    let (status, body) = send(app(), get("/api/historical/MSFT?period=forever")).await;
    assert_eq!(status, StatusCode::OK);
    // 400 bars all fall inside the 730-day window
    assert_eq!(body["data"].as_array().unwrap().len(), 400);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send(app(), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let req = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(req).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
