//! API route configuration.

use crate::api::handlers::{
    create_sighting_handler, list_sightings_handler, lookup_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::post,
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST /photos`    - Batch photo lookup (cache-first, enqueues misses)
/// - `POST /sightings` - Log a sighting for the calling user
/// - `GET  /sightings` - List the calling user's sightings
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/photos", post(lookup_handler))
        .route(
            "/sightings",
            post(create_sighting_handler).get(list_sightings_handler),
        )
}
