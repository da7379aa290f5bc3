use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mysfits_core::MysfitId;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::LikeError;
use crate::monolith::Monolith;

pub type SharedMonolith = Arc<dyn Monolith>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

/// GET /
///
/// Healthy only while the monolith is; answers with the monolith's status.
pub async fn health_handler(State(monolith): State<SharedMonolith>) -> Result<Response, LikeError> {
    let upstream = monolith.health().await?;
    let message = if upstream.status.is_success() {
        "Health check, monolith service available."
    } else {
        "Health check, monolith service unhealthy."
    };
    Ok((upstream.status, Json(HealthResponse { message })).into_response())
}

/// POST /mysfits/{id}/like
///
/// Forwards to the monolith's fulfill-like and relays its status and body.
pub async fn like_handler(
    State(monolith): State<SharedMonolith>,
    Path(id_str): Path<String>,
) -> Result<Response, LikeError> {
    let id = MysfitId::new(&id_str).map_err(|e| LikeError::InvalidId(e.to_string()))?;

    let upstream = monolith.fulfill_like(&id).await?;
    info!(mysfit_id = %id, status = %upstream.status, "like forwarded to monolith");

    Ok((upstream.status, [(CONTENT_TYPE, "application/json")], upstream.body).into_response())
}

/// Build the like service router. CORS is open as the browser calls it directly.
pub fn create_app(monolith: SharedMonolith) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/mysfits/{id}/like", post(like_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(monolith)
}
