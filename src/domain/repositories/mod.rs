//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; concrete implementations
//! live in [`crate::infrastructure::persistence`]. Mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Available Repositories
//!
//! - [`PhotoCacheRepository`] - Photo cache entry state and queue selection
//! - [`SightingRepository`] - Sighting create/list
//! - [`RateBudgetRepository`] - Persistent provider request budgets

pub mod photo_cache_repository;
pub mod rate_budget_repository;
pub mod sighting_repository;

pub use photo_cache_repository::PhotoCacheRepository;
pub use rate_budget_repository::RateBudgetRepository;
pub use sighting_repository::SightingRepository;

#[cfg(test)]
pub use photo_cache_repository::MockPhotoCacheRepository;
#[cfg(test)]
pub use rate_budget_repository::MockRateBudgetRepository;
#[cfg(test)]
pub use sighting_repository::MockSightingRepository;
