//! Background enrichment of the photo cache.

pub mod worker;

pub use worker::{EnrichmentWorker, RunSummary, WorkerSettings, MAX_RETRIES};
