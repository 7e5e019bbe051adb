//! Background enrichment worker converting PENDING cache entries into
//! COMPLETED or FAILED via the configured image provider.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::CacheEntry;
use crate::domain::repositories::PhotoCacheRepository;
use crate::error::AppError;
use crate::infrastructure::providers::ImageProvider;
use crate::utils::species_name::{derive_common_name, is_hybrid_species};

/// Consecutive transient failures before an entry is terminally FAILED.
pub const MAX_RETRIES: i32 = 3;

/// Base backoff in minutes; doubles per failure (5, 10, 20, ...).
const BACKOFF_BASE_MINUTES: i64 = 5;

/// Backoff window after the `error_count`-th transient failure.
pub fn backoff_delay(error_count: i32) -> chrono::Duration {
    let exponent = (error_count - 1).clamp(0, 16) as u32;
    chrono::Duration::minutes(BACKOFF_BASE_MINUTES * 2_i64.pow(exponent))
}

/// Tunables for one worker instance.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Entries drained per run; bounds external API calls per run.
    pub batch_size: i64,
    /// Politeness delay after each processed entry.
    pub request_delay: Duration,
}

/// Counters for one worker run, logged at run end.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub selected: usize,
    pub completed: usize,
    pub failed: usize,
    pub retried: usize,
}

/// Periodic queue drainer.
///
/// Each run is a single bounded batch processed strictly sequentially;
/// every entry's state transition is committed before the next entry
/// starts, so a crashed run loses at most one in-flight entry, which the
/// lookup staleness check later recovers.
pub struct EnrichmentWorker {
    cache: Arc<dyn PhotoCacheRepository>,
    provider: Arc<dyn ImageProvider>,
    settings: WorkerSettings,
}

enum EntryOutcome {
    Completed,
    Failed,
    Retried,
}

impl EnrichmentWorker {
    pub fn new(
        cache: Arc<dyn PhotoCacheRepository>,
        provider: Arc<dyn ImageProvider>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            cache,
            provider,
            settings,
        }
    }

    /// Runs forever on a fixed schedule. Run-level errors are logged and do
    /// not stop the loop; entry-level commits are already durable.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_once().await {
                Ok(summary) => {
                    if summary.selected > 0 {
                        tracing::info!(
                            selected = summary.selected,
                            completed = summary.completed,
                            failed = summary.failed,
                            retried = summary.retried,
                            "enrichment run finished"
                        );
                    }
                }
                Err(e) => tracing::error!("enrichment run failed: {e}"),
            }
        }
    }

    /// Drains one batch of the highest-priority PENDING entries.
    pub async fn run_once(&self) -> Result<RunSummary, AppError> {
        let now = Utc::now();
        let batch = self
            .cache
            .select_pending(self.settings.batch_size, now)
            .await?;

        let mut summary = RunSummary {
            selected: batch.len(),
            ..Default::default()
        };

        for entry in &batch {
            match self.process_entry(entry, now).await {
                Ok(EntryOutcome::Completed) => summary.completed += 1,
                Ok(EntryOutcome::Failed) => summary.failed += 1,
                Ok(EntryOutcome::Retried) => summary.retried += 1,
                Err(e) => {
                    tracing::warn!(species_code = %entry.species_code, "entry processing failed: {e}");
                }
            }

            // Politeness delay toward the external API.
            tokio::time::sleep(self.settings.request_delay).await;
        }

        Ok(summary)
    }

    async fn process_entry(
        &self,
        entry: &CacheEntry,
        now: DateTime<Utc>,
    ) -> Result<EntryOutcome, AppError> {
        let code = &entry.species_code;
        self.cache.mark_processing(code).await?;

        let com_name = if entry.com_name.is_empty() {
            derive_common_name(code).unwrap_or_default()
        } else {
            entry.com_name.clone()
        };

        if is_hybrid_species(&com_name, &entry.sci_name) {
            tracing::info!(species_code = %code, "skipping hybrid species");
            // Single pass: no retry budget consumed, no backoff.
            self.cache
                .fail(code, "skipped: hybrid species", entry.error_count)
                .await?;
            return Ok(EntryOutcome::Failed);
        }

        match self
            .provider
            .resolve_image(&entry.sci_name, &com_name)
            .await
        {
            Ok(Some(image)) => {
                self.cache
                    .complete(
                        code,
                        &image.thumbnail_url,
                        image.original_url.as_deref(),
                        &com_name,
                    )
                    .await?;
                tracing::debug!(species_code = %code, provider = self.provider.name(), "image resolved");
                Ok(EntryOutcome::Completed)
            }
            Ok(None) => {
                // A true miss; retrying will not change it.
                let error_count = entry.error_count + 1;
                self.cache
                    .fail(
                        code,
                        &format!("no image found via {}", self.provider.name()),
                        error_count,
                    )
                    .await?;
                Ok(EntryOutcome::Failed)
            }
            Err(e) => {
                let error_count = entry.error_count + 1;
                if error_count >= MAX_RETRIES {
                    self.cache
                        .fail(code, &e.to_string(), error_count)
                        .await?;
                    Ok(EntryOutcome::Failed)
                } else {
                    let process_after = now + backoff_delay(error_count);
                    self.cache
                        .schedule_retry(code, &e.to_string(), error_count, process_after)
                        .await?;
                    Ok(EntryOutcome::Retried)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CacheEntry, RawCacheEntry};
    use crate::domain::repositories::MockPhotoCacheRepository;
    use crate::infrastructure::providers::{MockImageProvider, ProviderError, ResolvedImage};

    fn pending_entry(code: &str, com_name: &str, error_count: i32) -> CacheEntry {
        CacheEntry::from_raw(
            RawCacheEntry {
                species_code: Some(code.to_string()),
                status: Some("PENDING".to_string()),
                com_name: Some(com_name.to_string()),
                error_count: Some(error_count),
                ..Default::default()
            },
            code,
        )
    }

    fn settings() -> WorkerSettings {
        WorkerSettings {
            batch_size: 10,
            request_delay: Duration::from_millis(0),
        }
    }

    fn worker(
        cache: MockPhotoCacheRepository,
        provider: MockImageProvider,
    ) -> EnrichmentWorker {
        EnrichmentWorker::new(Arc::new(cache), Arc::new(provider), settings())
    }

    fn provider_named(mut provider: MockImageProvider) -> MockImageProvider {
        provider.expect_name().return_const("wikipedia");
        provider
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(1), chrono::Duration::minutes(5));
        assert_eq!(backoff_delay(2), chrono::Duration::minutes(10));
        assert_eq!(backoff_delay(3), chrono::Duration::minutes(20));
    }

    #[tokio::test]
    async fn test_successful_resolution_completes_entry() {
        let mut cache = MockPhotoCacheRepository::new();
        cache
            .expect_select_pending()
            .times(1)
            .returning(|_, _| Ok(vec![pending_entry("mallar3", "Mallard", 0)]));
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_complete()
            .withf(|code, thumb, orig, com| {
                code == "mallar3"
                    && thumb == "https://x/thumb.jpg"
                    && *orig == Some("https://x/orig.jpg")
                    && com == "Mallard"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let mut provider = MockImageProvider::new();
        provider
            .expect_resolve_image()
            .withf(|_, com| com == "Mallard")
            .times(1)
            .returning(|_, _| {
                Ok(Some(ResolvedImage {
                    thumbnail_url: "https://x/thumb.jpg".to_string(),
                    original_url: Some("https://x/orig.jpg".to_string()),
                }))
            });

        let summary = worker(cache, provider_named(provider)).run_once().await.unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_hybrid_species_skips_provider_entirely() {
        let mut cache = MockPhotoCacheRepository::new();
        cache.expect_select_pending().times(1).returning(|_, _| {
            Ok(vec![pending_entry(
                "x00001",
                "Mallard x American Black Duck",
                0,
            )])
        });
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_fail()
            .withf(|code, reason, error_count| {
                code == "x00001" && reason.contains("hybrid") && *error_count == 0
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut provider = MockImageProvider::new();
        // Call-count assertion: hybrids never reach the provider.
        provider.expect_resolve_image().times(0);

        let summary = worker(cache, provider).run_once().await.unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_provider_miss_fails_without_backoff() {
        let mut cache = MockPhotoCacheRepository::new();
        cache
            .expect_select_pending()
            .times(1)
            .returning(|_, _| Ok(vec![pending_entry("mallar3", "Mallard", 0)]));
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_fail()
            .withf(|_, reason, error_count| reason.contains("no image") && *error_count == 1)
            .times(1)
            .returning(|_, _, _| Ok(()));
        cache.expect_schedule_retry().times(0);

        let mut provider = MockImageProvider::new();
        provider
            .expect_resolve_image()
            .times(1)
            .returning(|_, _| Ok(None));

        let summary = worker(cache, provider_named(provider)).run_once().await.unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_transient_error_schedules_backoff() {
        let mut cache = MockPhotoCacheRepository::new();
        let started = Utc::now();
        cache
            .expect_select_pending()
            .times(1)
            .returning(|_, _| Ok(vec![pending_entry("mallar3", "Mallard", 0)]));
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_schedule_retry()
            .withf(move |_, _, error_count, process_after| {
                // First failure: 5-minute window.
                *error_count == 1
                    && *process_after >= started + chrono::Duration::minutes(5)
                    && *process_after <= Utc::now() + chrono::Duration::minutes(5)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        cache.expect_fail().times(0);

        let mut provider = MockImageProvider::new();
        provider
            .expect_resolve_image()
            .times(1)
            .returning(|_, _| Err(ProviderError::Transport("connection refused".to_string())));

        let summary = worker(cache, provider).run_once().await.unwrap();
        assert_eq!(summary.retried, 1);
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion_is_terminal() {
        let mut cache = MockPhotoCacheRepository::new();
        cache
            .expect_select_pending()
            .times(1)
            .returning(|_, _| Ok(vec![pending_entry("mallar3", "Mallard", 2)]));
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_fail()
            .withf(|_, _, error_count| *error_count == 3)
            .times(1)
            .returning(|_, _, _| Ok(()));
        cache.expect_schedule_retry().times(0);

        let mut provider = MockImageProvider::new();
        provider
            .expect_resolve_image()
            .times(1)
            .returning(|_, _| Err(ProviderError::Transport("timeout".to_string())));

        let summary = worker(cache, provider).run_once().await.unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_common_name_derived_from_code_when_missing() {
        let mut cache = MockPhotoCacheRepository::new();
        cache
            .expect_select_pending()
            .times(1)
            .returning(|_, _| Ok(vec![pending_entry("mallar3", "", 0)]));
        cache
            .expect_mark_processing()
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_complete()
            .withf(|_, _, _, com| com == "Mallar")
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let mut provider = MockImageProvider::new();
        provider
            .expect_resolve_image()
            .withf(|_, com| com == "Mallar")
            .times(1)
            .returning(|_, _| {
                Ok(Some(ResolvedImage {
                    thumbnail_url: "https://x/thumb.jpg".to_string(),
                    original_url: None,
                }))
            });

        worker(cache, provider_named(provider)).run_once().await.unwrap();
    }

    #[tokio::test]
    async fn test_entry_failure_does_not_abort_run() {
        let mut cache = MockPhotoCacheRepository::new();
        cache.expect_select_pending().times(1).returning(|_, _| {
            Ok(vec![
                pending_entry("broken1", "First", 0),
                pending_entry("mallar3", "Mallard", 0),
            ])
        });
        cache.expect_mark_processing().returning(|code| {
            if code == "broken1" {
                Err(AppError::internal("Database error", serde_json::json!({})))
            } else {
                Ok(())
            }
        });
        cache
            .expect_complete()
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let mut provider = MockImageProvider::new();
        provider.expect_resolve_image().times(1).returning(|_, _| {
            Ok(Some(ResolvedImage {
                thumbnail_url: "https://x/thumb.jpg".to_string(),
                original_url: None,
            }))
        });

        let summary = worker(cache, provider_named(provider)).run_once().await.unwrap();
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.completed, 1);
    }
}
