//! Application state shared across HTTP handlers.

use std::sync::Arc;

use crate::application::services::{LookupService, SightingService};
use crate::domain::repositories::PhotoCacheRepository;

/// Shared application state.
///
/// Cloned per request by axum; all fields are `Arc`-backed so clones are
/// cheap.
#[derive(Clone)]
pub struct AppState {
    pub lookup_service: Arc<LookupService>,
    pub sighting_service: Arc<SightingService>,
    /// Used directly by the health check to report queue depth.
    pub photo_cache: Arc<dyn PhotoCacheRepository>,
}

impl AppState {
    pub fn new(
        lookup_service: Arc<LookupService>,
        sighting_service: Arc<SightingService>,
        photo_cache: Arc<dyn PhotoCacheRepository>,
    ) -> Self {
        Self {
            lookup_service,
            sighting_service,
            photo_cache,
        }
    }
}
