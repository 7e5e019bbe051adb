//! HTTP middleware for the API surface.
//!
//! - [`rate_limit`] - Per-IP token bucket rate limiting
//! - [`tracing`] - Structured request/response logging

pub mod rate_limit;
pub mod tracing;
