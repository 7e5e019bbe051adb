//! Handlers for sighting endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::sightings::{
    CreateSightingRequest, SightingListResponse, SightingResponse,
};
use crate::domain::entities::NewSighting;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the opaque user identity set by the upstream identity
/// provider. Authentication itself happens before requests reach this
/// service.
const USER_ID_HEADER: &str = "x-user-id";

fn require_user_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::unauthorized(
                "Missing user identity",
                json!({ "header": USER_ID_HEADER }),
            )
        })
}

/// Logs a new sighting for the calling user.
///
/// # Endpoint
///
/// `POST /api/sightings`
pub async fn create_sighting_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSightingRequest>,
) -> Result<(StatusCode, Json<SightingResponse>), AppError> {
    let user_id = require_user_id(&headers)?;
    payload.validate()?;

    let sighting = state
        .sighting_service
        .log_sighting(NewSighting {
            user_id,
            species_code: payload.species_code,
            com_name: payload.com_name,
            sci_name: payload.sci_name,
            location_name: payload.location_name,
            latitude: payload.latitude,
            longitude: payload.longitude,
            notes: payload.notes,
            observed_at: payload.observed_at,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(sighting.into())))
}

/// Lists the calling user's sightings, most recent observation first.
///
/// # Endpoint
///
/// `GET /api/sightings`
pub async fn list_sightings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SightingListResponse>, AppError> {
    let user_id = require_user_id(&headers)?;

    let sightings = state
        .sighting_service
        .list_sightings(&user_id)
        .await?
        .into_iter()
        .map(SightingResponse::from)
        .collect();

    Ok(Json(SightingListResponse { sightings }))
}
