//! PostgreSQL implementation of the rate budget repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::RateBudget;
use crate::domain::repositories::RateBudgetRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct RateBudgetRow {
    name: String,
    window_start: DateTime<Utc>,
    request_count: i32,
    last_request: DateTime<Utc>,
}

/// PostgreSQL repository for persistent provider request budgets.
pub struct PgRateBudgetRepository {
    pool: Arc<PgPool>,
}

impl PgRateBudgetRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateBudgetRepository for PgRateBudgetRepository {
    async fn find(&self, name: &str) -> Result<Option<RateBudget>, AppError> {
        let row = sqlx::query_as::<_, RateBudgetRow>(
            "SELECT name, window_start, request_count, last_request FROM rate_budget WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| RateBudget {
            name: r.name,
            window_start: r.window_start,
            request_count: r.request_count,
            last_request: r.last_request,
        }))
    }

    async fn reset(&self, name: &str, window_start: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO rate_budget (name, window_start, request_count, last_request)
            VALUES ($1, $2, 0, $2)
            ON CONFLICT (name) DO UPDATE
            SET window_start = EXCLUDED.window_start,
                request_count = 0,
                last_request = EXCLUDED.last_request
            "#,
        )
        .bind(name)
        .bind(window_start)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn increment(&self, name: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE rate_budget SET request_count = request_count + 1, last_request = now() WHERE name = $1",
        )
        .bind(name)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
