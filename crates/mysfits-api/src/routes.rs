use axum::Json;
use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::info;

use mysfits_core::{AlignmentAxis, AlignmentFilter, ClickEvent, MysfitId, MysfitProfile};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub filter: Option<String>,
    pub value: Option<String>,
}

impl FilterQuery {
    /// `None` when neither parameter is given; both are required otherwise.
    pub fn into_filter(self) -> Result<Option<AlignmentFilter>, ApiError> {
        let filter = self.filter.filter(|f| !f.is_empty());
        let value = self.value.filter(|v| !v.is_empty());

        match (filter, value) {
            (None, None) => Ok(None),
            (Some(filter), Some(value)) => {
                let axis = filter
                    .parse::<AlignmentAxis>()
                    .map_err(|e| ApiError::InvalidFilter(e.to_string()))?;
                Ok(Some(AlignmentFilter::new(axis, value)))
            }
            _ => Err(ApiError::InvalidFilter(
                "filter and value must be given together".to_string(),
            )),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct MysfitListResponse {
    pub mysfits: Vec<MysfitProfile>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct ClickResponse {
    pub status: &'static str,
}

fn parse_id(raw: &str) -> Result<MysfitId, ApiError> {
    MysfitId::new(raw).map_err(|e| ApiError::InvalidId(e.to_string()))
}

/// GET /
///
/// Load balancer health check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Nothing here, used for health check. Try /api/mysfits instead.",
    })
}

/// GET /api/mysfits?filter=GoodEvil&value=Evil
///
/// Returns every mysfit, or only those matching the filter when both
/// `filter` and `value` are given. A malformed query string is a 400.
pub async fn list_mysfits_handler(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<FilterQuery>, ApiError>,
) -> Result<Json<MysfitListResponse>, ApiError> {
    let mysfits = match query.into_filter()? {
        Some(filter) => state.mysfits.list_by_alignment(&filter).await?,
        None => state.mysfits.list_mysfits().await?,
    };

    Ok(Json(MysfitListResponse {
        mysfits: mysfits.into_iter().map(MysfitProfile::from).collect(),
    }))
}

/// GET /api/mysfits/{id}
pub async fn get_mysfit_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<MysfitProfile>, ApiError> {
    let id = parse_id(&id_str)?;
    let mysfit = state.mysfits.get_mysfit(&id).await?;
    Ok(Json(mysfit.into()))
}

/// POST /api/mysfits/{id}/like
///
/// Also mounted at `/mysfits/{id}/fulfill-like` and
/// `/api/mysfits/{id}/fulfill-like`, where the like service forwards to.
pub async fn like_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id_str)?;
    let mysfit = state.mysfits.like_mysfit(&id).await?;
    info!(mysfit_id = %id, likes = mysfit.likes, "mysfit liked");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/mysfits/{id}/adopt
pub async fn adopt_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id_str)?;
    state.mysfits.adopt_mysfit(&id).await?;
    info!(mysfit_id = %id, "mysfit adopted");
    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /clicks
///
/// Forwards a profile click to the clickstream. Bodies that are not a JSON
/// click get the same 400 as invalid fields.
pub async fn click_handler(
    State(state): State<AppState>,
    WithRejection(Json(click), _): WithRejection<Json<ClickEvent>, ApiError>,
) -> Result<Json<ClickResponse>, ApiError> {
    if click.user_id.trim().is_empty() {
        return Err(ApiError::InvalidClick("userId must not be empty".to_string()));
    }
    let id = MysfitId::new(&click.mysfit_id).map_err(|e| ApiError::InvalidClick(e.to_string()))?;

    let click = ClickEvent {
        mysfit_id: id.to_string(),
        user_id: click.user_id,
    };
    state.clicks.record_click(&click).await?;

    Ok(Json(ClickResponse { status: "OK" }))
}
