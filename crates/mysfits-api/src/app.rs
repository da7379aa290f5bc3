use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::errors::ApiError;
use crate::routes::{
    adopt_handler, click_handler, get_mysfit_handler, health_handler, like_handler,
    list_mysfits_handler,
};
use crate::state::AppState;

/// Give the bare 408 from `TimeoutLayer` the same JSON body as other errors.
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}

/// Build the application router with all routes and middleware.
pub fn create_app(state: AppState, request_timeout: Duration, permissive_cors: bool) -> Router {
    let api_routes = Router::new()
        .route("/mysfits", get(list_mysfits_handler))
        .route("/mysfits/{id}", get(get_mysfit_handler))
        .route("/mysfits/{id}/like", post(like_handler))
        .route("/mysfits/{id}/fulfill-like", post(like_handler))
        .route("/mysfits/{id}/adopt", post(adopt_handler));

    let router = Router::new()
        .route("/", get(health_handler))
        .route("/clicks", put(click_handler))
        .route("/mysfits/{id}/fulfill-like", post(like_handler))
        .nest("/api", api_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_as_json))
        .layer(TraceLayer::new_for_http());

    let router = if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
