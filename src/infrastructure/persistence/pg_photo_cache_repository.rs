//! PostgreSQL implementation of the photo cache repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{CacheEntry, RawCacheEntry};
use crate::domain::repositories::PhotoCacheRepository;
use crate::error::AppError;

const COLUMNS: &str = "species_code, status, com_name, sci_name, image_url, thumbnail_url, \
     original_url, created_at, updated_at, process_after, priority, error_count, last_error";

/// PostgreSQL repository for photo cache entries.
///
/// All writes are field-targeted single-row UPDATEs; the priority bump uses
/// an in-database increment so racing lookups never lose more than the
/// tolerated single demand signal. Reads pass through the versioned-read
/// adapter ([`CacheEntry::from_raw`]).
pub struct PgPhotoCacheRepository {
    pool: Arc<PgPool>,
}

impl PgPhotoCacheRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoCacheRepository for PgPhotoCacheRepository {
    async fn find(&self, species_code: &str) -> Result<Option<CacheEntry>, AppError> {
        let raw = sqlx::query_as::<_, RawCacheEntry>(&format!(
            "SELECT {COLUMNS} FROM photo_cache WHERE species_code = $1"
        ))
        .bind(species_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(raw.map(|r| CacheEntry::from_raw(r, species_code)))
    }

    async fn create_pending(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO photo_cache (species_code, status, com_name, sci_name, priority)
            VALUES ($1, 'PENDING', $2, $3, 1)
            ON CONFLICT (species_code) DO NOTHING
            "#,
        )
        .bind(species_code)
        .bind(com_name)
        .bind(sci_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn fill_names(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET com_name = COALESCE(NULLIF(com_name, ''), $2),
                sci_name = COALESCE(NULLIF(sci_name, ''), $3),
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(com_name)
        .bind(sci_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn bump_priority(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        // updated_at is left alone so starved entries keep their place in
        // the worker's oldest-first tie-break.
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET priority = priority + 1,
                com_name = COALESCE(NULLIF(com_name, ''), $2),
                sci_name = COALESCE(NULLIF(sci_name, ''), $3)
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(com_name)
        .bind(sci_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn reset_stale(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET status = 'PENDING',
                priority = priority + 1,
                com_name = COALESCE(NULLIF(com_name, ''), $2),
                sci_name = COALESCE(NULLIF(sci_name, ''), $3),
                created_at = now(),
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(com_name)
        .bind(sci_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn reset_failed(
        &self,
        species_code: &str,
        com_name: &str,
        sci_name: &str,
    ) -> Result<(), AppError> {
        // error_count is intentionally preserved: the retry budget spans
        // client-driven resets.
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET status = 'PENDING',
                priority = 1,
                com_name = COALESCE(NULLIF(com_name, ''), $2),
                sci_name = COALESCE(NULLIF(sci_name, ''), $3),
                image_url = NULL,
                thumbnail_url = NULL,
                original_url = NULL,
                process_after = NULL,
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(com_name)
        .bind(sci_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn select_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CacheEntry>, AppError> {
        let rows = sqlx::query_as::<_, RawCacheEntry>(&format!(
            r#"
            SELECT {COLUMNS} FROM photo_cache
            WHERE status = 'PENDING'
              AND (process_after IS NULL OR process_after <= $2)
            ORDER BY priority DESC, updated_at ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let code = r.species_code.clone().unwrap_or_default();
                CacheEntry::from_raw(r, &code)
            })
            .collect())
    }

    async fn mark_processing(&self, species_code: &str) -> Result<(), AppError> {
        // created_at doubles as the claim timestamp: the lookup staleness
        // check measures from it, so refreshing it here gives the worker a
        // full window before a lookup may steal the entry back.
        sqlx::query(
            "UPDATE photo_cache SET status = 'PROCESSING', created_at = now(), updated_at = now() WHERE species_code = $1",
        )
        .bind(species_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn complete<'a>(
        &self,
        species_code: &str,
        thumbnail_url: &str,
        original_url: Option<&'a str>,
        com_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET status = 'COMPLETED',
                thumbnail_url = $2,
                original_url = $3,
                image_url = $2,
                com_name = COALESCE(NULLIF(com_name, ''), $4),
                process_after = NULL,
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(thumbnail_url)
        .bind(original_url)
        .bind(com_name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn fail(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET status = 'FAILED',
                last_error = $2,
                error_count = $3,
                process_after = NULL,
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(last_error)
        .bind(error_count)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn schedule_retry(
        &self,
        species_code: &str,
        last_error: &str,
        error_count: i32,
        process_after: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE photo_cache
            SET status = 'PENDING',
                last_error = $2,
                error_count = $3,
                process_after = $4,
                updated_at = now()
            WHERE species_code = $1
            "#,
        )
        .bind(species_code)
        .bind(last_error)
        .bind(error_count)
        .bind(process_after)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM photo_cache WHERE status = 'PENDING'",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
