//! Repository trait for sighting data access.

use crate::domain::entities::{NewSighting, Sighting};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for bird sightings.
///
/// Plain create/list with last-write-wins semantics; no conflict handling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SightingRepository: Send + Sync {
    /// Stores a new sighting and returns it with generated fields.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_sighting: NewSighting) -> Result<Sighting, AppError>;

    /// Lists a user's sightings ordered by observation time descending.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Sighting>, AppError>;
}
