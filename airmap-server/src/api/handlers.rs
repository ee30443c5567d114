//! Request handlers.

use airmap::{AirmapError, MapRequest, MapResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::core::state::AppState;

/// `POST /api/maps/generate`
pub async fn generate_maps(
    State(state): State<AppState>,
    payload: Result<Json<MapRequest>, JsonRejection>,
) -> Result<Json<MapResponse>, ApiError> {
    let Json(request) = payload?;
    let request = request.validate().map_err(AirmapError::from)?;
    log::debug!(
        "Generating {} maps for {:?} in {:?}",
        request.dataset(),
        request.regions(),
        request.years()
    );

    Ok(Json(state.catalog().query(&request)?))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
