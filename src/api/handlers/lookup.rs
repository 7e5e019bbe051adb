//! Handler for the batch photo lookup endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::lookup::{LookupRequest, LookupResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves photo data for a batch of species codes.
///
/// # Endpoint
///
/// `POST /api/photos`
///
/// # Behavior
///
/// Returns immediately with whatever the cache holds. Unknown codes are
/// enqueued for the background enrichment worker and come back as `null`;
/// the client re-requests later and picks up completed entries. The
/// external image provider is never called on this path.
///
/// # Request Body
///
/// ```json
/// {
///   "speciesCodes": ["mallar3", "norcar"],
///   "commonNames": { "mallar3": "Mallard" },
///   "scientificNames": { "mallar3": "Anas platyrhynchos" }
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "photosByBird": {
///     "mallar3": {
///       "speciesCode": "mallar3",
///       "comName": "Mallard",
///       "imageUrl": "https://x/thumb.jpg",
///       "thumbnailUrl": "https://x/thumb.jpg",
///       "originalUrl": "https://x/orig.jpg"
///     },
///     "norcar": null
///   }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request when `speciesCodes` is missing or empty.
/// Per-code failures yield `null` for that code only.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Json(payload): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    payload.validate()?;

    let photos_by_bird = state
        .lookup_service
        .get_bird_photos(
            &payload.species_codes,
            &payload.common_names,
            &payload.scientific_names,
        )
        .await?;

    Ok(Json(LookupResponse { photos_by_bird }))
}
