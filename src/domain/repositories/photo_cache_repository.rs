//! Repository trait for photo cache data access.

use crate::domain::entities::CacheEntry;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the photo cache collection.
///
/// Writes are field-targeted per species code; concurrent writers (a lookup
/// request racing a worker run on the same entry) are tolerated by design,
/// so no method takes a version or lock token.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgPhotoCacheRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoCacheRepository: Send + Sync {
    /// Finds the cache entry for a species code, normalized through the
    /// versioned-read adapter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find(&self, species_code: &str) -> Result<Option<CacheEntry>, AppError>;

    /// Creates a `PENDING` entry with priority 1 if none exists.
    ///
    /// Idempotent: an existing entry is left untouched.
    async fn create_pending(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError>;

    /// Fills `com_name`/`sci_name` where currently empty. Non-empty stored
    /// values are never overwritten.
    async fn fill_names(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError>;

    /// Atomically increments `priority` and fills empty names.
    ///
    /// Demand signal for still-queued entries; does not touch `status`.
    async fn bump_priority(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError>;

    /// Resets a stuck `PROCESSING` entry back to `PENDING` with
    /// `priority + 1`, filling empty names.
    async fn reset_stale(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError>;

    /// Resets a `FAILED` entry to `PENDING` with priority 1, clearing the
    /// backoff gate. `error_count` carries forward so the overall retry
    /// budget spans resets; empty names are filled from the arguments.
    async fn reset_failed(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError>;

    /// Selects up to `limit` `PENDING` entries ordered by `priority`
    /// descending then `updated_at` ascending, excluding entries whose
    /// `process_after` is after `now`.
    async fn select_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CacheEntry>, AppError>;

    /// Marks an entry `PROCESSING`.
    async fn mark_processing(&self, species_code: &str) -> Result<(), AppError>;

    /// Marks an entry `COMPLETED` with resolved image URLs, filling
    /// `com_name` if still empty. The legacy `image_url` field is set to
    /// the thumbnail for old readers.
    async fn complete<'a>(
        &self,
        species_code: &str,
        thumbnail_url: &str,
        original_url: Option<&'a str>,
        com_name: &str,
    ) -> Result<(), AppError>;

    /// Marks an entry terminally `FAILED` with error bookkeeping and clears
    /// the backoff gate.
    async fn fail(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
    ) -> Result<(), AppError>;

    /// Returns an entry to `PENDING` with a future `process_after` so the
    /// worker skips it until the backoff window elapses.
    async fn schedule_retry(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
        process_after: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Number of entries currently awaiting enrichment. Used by the health
    /// endpoint.
    async fn pending_count(&self) -> Result<i64, AppError>;
}
