use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Like service errors with JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    /// Path id is not a valid mysfit id.
    #[error("{0}")]
    InvalidId(String),
    /// The monolith could not be reached or did not answer in time.
    #[error("monolith request failed: {0}")]
    Monolith(#[from] reqwest::Error),
}

impl IntoResponse for LikeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LikeError::InvalidId(msg) => (StatusCode::BAD_REQUEST, msg),
            LikeError::Monolith(e) => {
                tracing::error!("Monolith error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Monolith service unavailable".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
