//! External image provider adapters.
//!
//! A provider resolves a best-effort image for a species given its
//! scientific and common names. The worker's scheduling and backoff logic
//! is provider-agnostic; rate-limit policy lives inside each adapter.
//!
//! # Implementations
//!
//! - [`WikipediaProvider`] - Encyclopedia summary API (default)
//! - [`UnsplashProvider`] - Stock-photo search API with a persistent
//!   request budget

pub mod unsplash;
pub mod wikipedia;

pub use unsplash::UnsplashProvider;
pub use wikipedia::WikipediaProvider;

use async_trait::async_trait;

/// A resolved image for one species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Reduced-size image suitable for list views (~320px).
    pub thumbnail_url: String,
    /// High-resolution original, when the source exposes one.
    pub original_url: Option<String>,
}

/// Provider failures that warrant a retry with backoff.
///
/// An upstream that responds without an image is not an error; it is an
/// `Ok(None)` miss and terminal for the entry.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability interface for image lookup.
///
/// `resolve_image` queries by scientific name first and falls back to the
/// common name. Implementations map upstream "no result" responses to
/// `Ok(None)` and reserve `Err` for transport-level failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn resolve_image(
        &self,
        sci_name: &str,
        com_name: &str,
    ) -> Result<Option<ResolvedImage>, ProviderError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}
