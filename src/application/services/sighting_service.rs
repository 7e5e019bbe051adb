//! Sighting create/list service.

use std::sync::Arc;

use crate::domain::entities::{NewSighting, Sighting};
use crate::domain::repositories::SightingRepository;
use crate::error::AppError;
use serde_json::json;

/// Service for logging and listing bird sightings.
///
/// Plain CRUD over the sightings store; last-write-wins, no conflict logic.
pub struct SightingService {
    sightings: Arc<dyn SightingRepository>,
}

impl SightingService {
    pub fn new(sightings: Arc<dyn SightingRepository>) -> Self {
        Self { sightings }
    }

    /// Stores a new sighting for a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the species code is empty.
    pub async fn log_sighting(&self, new_sighting: NewSighting) -> Result<Sighting, AppError> {
        if new_sighting.species_code.trim().is_empty() {
            return Err(AppError::bad_request(
                "speciesCode must not be empty",
                json!({ "field": "speciesCode" }),
            ));
        }

        self.sightings.create(new_sighting).await
    }

    /// Lists a user's sightings, most recent observation first.
    pub async fn list_sightings(&self, user_id: &str) -> Result<Vec<Sighting>, AppError> {
        self.sightings.list_by_user(user_id).await
    }
}
