//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`providers`] - External image provider adapters

pub mod persistence;
pub mod providers;
