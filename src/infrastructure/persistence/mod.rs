//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgPhotoCacheRepository`] - Photo cache entry state and queue selection
//! - [`PgSightingRepository`] - Sighting storage and retrieval
//! - [`PgRateBudgetRepository`] - Persistent provider request budgets

pub mod pg_photo_cache_repository;
pub mod pg_rate_budget_repository;
pub mod pg_sighting_repository;

pub use pg_photo_cache_repository::PgPhotoCacheRepository;
pub use pg_rate_budget_repository::PgRateBudgetRepository;
pub use pg_sighting_repository::PgSightingRepository;
