use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mysfits_core::CoreError;

use crate::clicks::ClickSinkError;

/// API error types with JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// Path id is not a valid mysfit id.
    InvalidId(String),
    /// Unknown or incomplete filter query.
    InvalidFilter(String),
    /// Click payload is missing fields.
    InvalidClick(String),
    /// Resource not found.
    NotFound(String),
    /// The request did not finish within the configured timeout.
    Timeout,
    /// Internal server error.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidId(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidFilter(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidClick(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timed out".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::MysfitId(e) => ApiError::InvalidId(e.to_string()),
            other => {
                tracing::error!("Core error: {other}");
                ApiError::Internal
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidFilter(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidClick(rejection.body_text())
    }
}

impl From<ClickSinkError> for ApiError {
    fn from(err: ClickSinkError) -> Self {
        tracing::error!("Click sink error: {err}");
        ApiError::Internal
    }
}
