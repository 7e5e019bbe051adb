//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`CacheEntry`] - One cached photo lookup per species code
//! - [`BirdImage`] - Resolved photo payload returned to clients
//! - [`Sighting`] - A logged bird observation
//! - [`RateBudget`] - Persistent request counter for an upstream API
//!
//! Entities are plain data structures; state transitions are orchestrated
//! by the services in [`crate::application`].

pub mod photo_cache;
pub mod rate_budget;
pub mod sighting;

pub use photo_cache::{BirdImage, CacheEntry, PhotoStatus, RawCacheEntry};
pub use rate_budget::RateBudget;
pub use sighting::{NewSighting, Sighting};
