#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bird_photo_cache::application::services::{LookupService, SightingService};
use bird_photo_cache::domain::entities::{
    CacheEntry, NewSighting, PhotoStatus, RawCacheEntry, Sighting,
};
use bird_photo_cache::domain::repositories::{PhotoCacheRepository, SightingRepository};
use bird_photo_cache::error::AppError;
use bird_photo_cache::infrastructure::providers::{
    ImageProvider, ProviderError, ResolvedImage,
};
use bird_photo_cache::state::AppState;

/// In-memory photo cache mirroring the PostgreSQL repository's
/// field-targeted update semantics.
#[derive(Default)]
pub struct InMemoryPhotoCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryPhotoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry directly, bypassing the repository methods.
    pub fn insert(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.species_code.clone(), entry);
    }

    pub fn get(&self, species_code: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(species_code).cloned()
    }

    fn update<F: FnOnce(&mut CacheEntry)>(&self, species_code: &str, f: F) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(species_code) {
            f(entry);
        }
    }
}

fn fill_empty(target: &mut String, value: &str) {
    if target.is_empty() {
        *target = value.to_string();
    }
}

#[async_trait]
impl PhotoCacheRepository for InMemoryPhotoCache {
    async fn find(&self, species_code: &str) -> Result<Option<CacheEntry>, AppError> {
        Ok(self.get(species_code))
    }

    async fn create_pending(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(species_code.to_string()).or_insert_with(|| {
            let mut entry = CacheEntry::from_raw(RawCacheEntry::default(), species_code);
            entry.com_name = com_name.to_string();
            entry.sci_name = sci_name.to_string();
            entry
        });
        Ok(())
    }

    async fn fill_names(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            fill_empty(&mut entry.com_name, com_name);
            fill_empty(&mut entry.sci_name, sci_name);
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn bump_priority(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        // updated_at intentionally untouched, matching the SQL implementation.
        self.update(species_code, |entry| {
            entry.priority += 1;
            fill_empty(&mut entry.com_name, com_name);
            fill_empty(&mut entry.sci_name, sci_name);
        });
        Ok(())
    }

    async fn reset_stale(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Pending;
            entry.priority += 1;
            fill_empty(&mut entry.com_name, com_name);
            fill_empty(&mut entry.sci_name, sci_name);
            entry.created_at = Utc::now();
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn reset_failed(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Pending;
            entry.priority = 1;
            fill_empty(&mut entry.com_name, com_name);
            fill_empty(&mut entry.sci_name, sci_name);
            entry.image_url = None;
            entry.thumbnail_url = None;
            entry.original_url = None;
            entry.process_after = None;
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn select_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CacheEntry>, AppError> {
        let entries = self.entries.lock().unwrap();
        let mut pending: Vec<CacheEntry> = entries
            .values()
            .filter(|e| {
                e.status == PhotoStatus::Pending
                    && e.process_after.is_none_or(|after| after <= now)
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.updated_at.cmp(&b.updated_at))
        });
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn mark_processing(&self, species_code: &str) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Processing;
            entry.created_at = Utc::now();
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn complete<'a>(
        &self,
        species_code: &str,
        thumbnail_url: &str,
        original_url: Option<&'a str>,
        com_name: &str,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Completed;
            entry.thumbnail_url = Some(thumbnail_url.to_string());
            entry.original_url = original_url.map(str::to_string);
            entry.image_url = Some(thumbnail_url.to_string());
            fill_empty(&mut entry.com_name, com_name);
            entry.process_after = None;
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn fail(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Failed;
            entry.last_error = last_error.to_string();
            entry.error_count = error_count;
            entry.process_after = None;
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn schedule_retry(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
        process_after: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.update(species_code, |entry| {
            entry.status = PhotoStatus::Pending;
            entry.last_error = last_error.to_string();
            entry.error_count = error_count;
            entry.process_after = Some(process_after);
            entry.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, AppError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .filter(|e| e.status == PhotoStatus::Pending)
            .count() as i64)
    }
}

/// In-memory sighting store with a sequential id counter.
#[derive(Default)]
pub struct InMemorySightingRepository {
    sightings: Mutex<Vec<Sighting>>,
    next_id: AtomicI64,
}

impl InMemorySightingRepository {
    pub fn new() -> Self {
        Self {
            sightings: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl SightingRepository for InMemorySightingRepository {
    async fn create(&self, new_sighting: NewSighting) -> Result<Sighting, AppError> {
        let sighting = Sighting {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: new_sighting.user_id,
            species_code: new_sighting.species_code,
            com_name: new_sighting.com_name,
            sci_name: new_sighting.sci_name,
            location_name: new_sighting.location_name,
            latitude: new_sighting.latitude,
            longitude: new_sighting.longitude,
            notes: new_sighting.notes,
            observed_at: new_sighting.observed_at,
            created_at: Utc::now(),
        };
        self.sightings.lock().unwrap().push(sighting.clone());
        Ok(sighting)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Sighting>, AppError> {
        let mut result: Vec<Sighting> = self
            .sightings
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        Ok(result)
    }
}

/// Canned provider response for one species name.
#[derive(Clone)]
pub enum Scripted {
    Image(ResolvedImage),
    Miss,
    TransportError(String),
}

/// Image provider driven by a per-name response script.
///
/// Responses are keyed by scientific name first, then common name; names
/// without a script are misses. Every call is recorded for assertions.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, name: &str, thumbnail: &str, original: Option<&str>) -> Self {
        self.responses.lock().unwrap().insert(
            name.to_string(),
            Scripted::Image(ResolvedImage {
                thumbnail_url: thumbnail.to_string(),
                original_url: original.map(str::to_string),
            }),
        );
        self
    }

    pub fn with_transport_error(self, name: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(name.to_string(), Scripted::TransportError(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for ScriptedProvider {
    async fn resolve_image(
        &self,
        sci_name: &str,
        com_name: &str,
    ) -> Result<Option<ResolvedImage>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((sci_name.to_string(), com_name.to_string()));

        let responses = self.responses.lock().unwrap();
        let script = responses
            .get(sci_name)
            .or_else(|| responses.get(com_name))
            .cloned();
        drop(responses);

        match script {
            Some(Scripted::Image(image)) => Ok(Some(image)),
            Some(Scripted::Miss) | None => Ok(None),
            Some(Scripted::TransportError(message)) => {
                Err(ProviderError::Transport(message))
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Seeds a cache entry in the given status with sensible defaults.
pub fn cache_entry(species_code: &str, status: PhotoStatus) -> CacheEntry {
    let mut entry = CacheEntry::from_raw(RawCacheEntry::default(), species_code);
    entry.status = status;
    entry
}

pub fn create_test_state(
    cache: Arc<InMemoryPhotoCache>,
    sightings: Arc<InMemorySightingRepository>,
) -> AppState {
    AppState::new(
        Arc::new(LookupService::new(cache.clone())),
        Arc::new(SightingService::new(sightings)),
        cache,
    )
}
