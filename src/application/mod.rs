//! Application layer orchestrating domain operations.
//!
//! # Components
//!
//! - [`services::LookupService`] - Batch photo lookup against the cache
//! - [`services::SightingService`] - Sighting create/list
//! - [`enrichment::EnrichmentWorker`] - Scheduled cache enrichment

pub mod enrichment;
pub mod services;
