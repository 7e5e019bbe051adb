//! Photo lookup service: cache-first reads with background enqueueing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::{BirdImage, PhotoStatus};
use crate::domain::repositories::PhotoCacheRepository;
use crate::error::AppError;
use serde_json::json;

/// Optional display names supplied by the client for one species code.
#[derive(Debug, Clone, Default)]
pub struct SpeciesNames {
    pub com_name: String,
    pub sci_name: String,
}

/// Service resolving batches of species codes against the photo cache.
///
/// Never calls the external image provider: misses are enqueued as
/// `PENDING` entries and picked up by the enrichment worker, keeping
/// lookup latency bounded and decoupled from third-party rate limits.
pub struct LookupService {
    cache: Arc<dyn PhotoCacheRepository>,
}

impl LookupService {
    pub fn new(cache: Arc<dyn PhotoCacheRepository>) -> Self {
        Self { cache }
    }

    /// Resolves a batch of species codes.
    ///
    /// Codes are processed independently and sequentially; a failure for
    /// one code is logged and yields `None` for that code only.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `species_codes` is empty.
    pub async fn get_bird_photos(
        &self,
        species_codes: &[String],
        common_names: &HashMap<String, String>,
        scientific_names: &HashMap<String, String>,
    ) -> Result<HashMap<String, Option<BirdImage>>, AppError> {
        if species_codes.is_empty() {
            return Err(AppError::bad_request(
                "The request must carry a non-empty 'speciesCodes' array",
                json!({ "field": "speciesCodes" }),
            ));
        }

        let mut results = HashMap::with_capacity(species_codes.len());

        for code in species_codes {
            let names = SpeciesNames {
                com_name: common_names.get(code).cloned().unwrap_or_default(),
                sci_name: scientific_names.get(code).cloned().unwrap_or_default(),
            };

            let resolved = match self.lookup_one(code, &names).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(species_code = %code, "lookup failed: {e}");
                    None
                }
            };

            results.insert(code.clone(), resolved);
        }

        Ok(results)
    }

    /// Resolves a single species code against the cache.
    ///
    /// - Unknown code: creates a `PENDING` entry with priority 1, returns `None`.
    /// - `COMPLETED` with an image: fills empty display names, returns the image.
    /// - `PENDING`/`PROCESSING`: bumps priority (demand signal); a
    ///   `PROCESSING` entry older than the staleness threshold is instead
    ///   reset to `PENDING` with `priority + 1`. Returns `None`.
    /// - `FAILED` (or `COMPLETED` without an image): resets to `PENDING`
    ///   with priority 1, returns `None`. `error_count` carries forward so
    ///   the retry budget spans resets.
    async fn lookup_one(
        &self,
        species_code: &str,
        names: &SpeciesNames,
    ) -> Result<Option<BirdImage>, AppError> {
        let Some(entry) = self.cache.find(species_code).await? else {
            self.cache
                .create_pending(species_code, &names.com_name, &names.sci_name)
                .await?;
            return Ok(None);
        };

        match entry.status {
            PhotoStatus::Completed if entry.has_image() => {
                if self.names_add_anything(&entry.com_name, &entry.sci_name, names) {
                    self.cache
                        .fill_names(species_code, &names.com_name, &names.sci_name)
                        .await?;
                }

                let mut entry = entry;
                if entry.com_name.is_empty() {
                    entry.com_name = names.com_name.clone();
                }
                Ok(entry.to_bird_image())
            }
            PhotoStatus::Pending | PhotoStatus::Processing => {
                if entry.is_stuck(Utc::now()) {
                    self.cache
                        .reset_stale(species_code, &names.com_name, &names.sci_name)
                        .await?;
                } else {
                    self.cache
                        .bump_priority(species_code, &names.com_name, &names.sci_name)
                        .await?;
                }
                Ok(None)
            }
            // FAILED, or a COMPLETED entry that lost its image: re-enqueue.
            _ => {
                self.cache
                    .reset_failed(species_code, &names.com_name, &names.sci_name)
                    .await?;
                Ok(None)
            }
        }
    }

    /// True when the client supplied a name the stored entry is missing.
    fn names_add_anything(&self, com_name: &str, sci_name: &str, names: &SpeciesNames) -> bool {
        (com_name.is_empty() && !names.com_name.is_empty())
            || (sci_name.is_empty() && !names.sci_name.is_empty())
    }
}
