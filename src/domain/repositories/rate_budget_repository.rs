//! Repository trait for persistent provider request budgets.

use crate::domain::entities::RateBudget;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the shared request-budget counters.
///
/// The counter lives in the database so it survives across stateless worker
/// invocations. Budget policy (limit, window length) belongs to the adapter
/// that owns the counter, not to this interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateBudgetRepository: Send + Sync {
    /// Fetches the budget row for a named upstream, if one exists.
    async fn find(&self, name: &str) -> Result<Option<RateBudget>, AppError>;

    /// Creates or resets the budget row with a fresh window starting at
    /// `window_start` and a zero counter.
    async fn reset(&self, name: &str, window_start: DateTime<Utc>) -> Result<(), AppError>;

    /// Atomically increments the request counter.
    async fn increment(&self, name: &str) -> Result<(), AppError>;
}
