//! HTTP error responses for web adapter.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::domain::error::StockcastError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl WebError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }
}

pub fn status_from_error(err: &StockcastError) -> StatusCode {
    match err {
        StockcastError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        StockcastError::UnknownSymbol { .. } => StatusCode::NOT_FOUND,
        StockcastError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StockcastError::DataUnavailable { .. } | StockcastError::ModelNotLoaded { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        StockcastError::ModelInvalid { .. }
        | StockcastError::NoTrainableData { .. }
        | StockcastError::ConfigParse { .. }
        | StockcastError::ConfigInvalid { .. }
        | StockcastError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StockcastError> for WebError {
    fn from(err: StockcastError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            error!(kind = err.kind(), error = %err, "request failed");
        }
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
