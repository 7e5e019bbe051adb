//! Unsplash search adapter with a persistent request budget.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{ImageProvider, ProviderError, ResolvedImage};
use crate::domain::repositories::RateBudgetRepository;

/// Budget document name in the `rate_budget` table.
const BUDGET_NAME: &str = "unsplash_api";

const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// Image lookup against the Unsplash search API.
///
/// The demo tier allows a small hourly request budget, tracked in a
/// database counter shared by all worker invocations. Calls beyond the
/// budget (and HTTP 429 responses) short-circuit to a configured
/// placeholder image so the queue keeps draining without burning quota.
pub struct UnsplashProvider {
    client: reqwest::Client,
    access_key: String,
    budget: Arc<dyn RateBudgetRepository>,
    request_limit: i32,
    window: Duration,
    placeholder_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoUrls {
    small: Option<String>,
    regular: Option<String>,
}

impl UnsplashProvider {
    pub fn new(
        access_key: impl Into<String>,
        budget: Arc<dyn RateBudgetRepository>,
        request_limit: i32,
        window: Duration,
        placeholder_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_key: access_key.into(),
            budget,
            request_limit,
            window,
            placeholder_url: placeholder_url.into(),
        }
    }

    fn placeholder(&self) -> ResolvedImage {
        ResolvedImage {
            thumbnail_url: self.placeholder_url.clone(),
            original_url: None,
        }
    }

    /// Checks the shared counter, resetting it when the window has elapsed.
    ///
    /// A budget read failure is treated as "at the limit" so a flaky
    /// counter can never push us over the upstream quota.
    async fn budget_available(&self) -> bool {
        let now = Utc::now();

        match self.budget.find(BUDGET_NAME).await {
            Ok(None) => {
                if let Err(e) = self.budget.reset(BUDGET_NAME, now).await {
                    tracing::warn!("failed to initialize unsplash budget: {e}");
                    return false;
                }
                true
            }
            Ok(Some(b)) => {
                if b.window_elapsed(now, self.window) {
                    if let Err(e) = self.budget.reset(BUDGET_NAME, now).await {
                        tracing::warn!("failed to reset unsplash budget window: {e}");
                        return false;
                    }
                    return true;
                }
                !b.is_exhausted(self.request_limit)
            }
            Err(e) => {
                tracing::warn!("failed to read unsplash budget: {e}");
                false
            }
        }
    }
}

/// Picks thumbnail/original URLs from the first search hit.
pub(crate) fn image_from_search(body: SearchResponse) -> Option<ResolvedImage> {
    let first = body.results.into_iter().next()?;
    let thumbnail = first.urls.small.or_else(|| first.urls.regular.clone())?;
    Some(ResolvedImage {
        thumbnail_url: thumbnail,
        original_url: first.urls.regular,
    })
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    async fn resolve_image(
        &self,
        sci_name: &str,
        com_name: &str,
    ) -> Result<Option<ResolvedImage>, ProviderError> {
        // Common name gives better stock-photo hits; "bird" improves relevance.
        let query = if !com_name.is_empty() {
            format!("{com_name} bird")
        } else if !sci_name.is_empty() {
            sci_name.to_string()
        } else {
            return Ok(None);
        };

        if !self.budget_available().await {
            tracing::info!(query, "unsplash budget exhausted, serving placeholder");
            return Ok(Some(self.placeholder()));
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("query", query.as_str()), ("per_page", "1")])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if let Err(e) = self.budget.increment(BUDGET_NAME).await {
            tracing::warn!("failed to increment unsplash budget: {e}");
        }

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("unsplash rate limit hit upstream, serving placeholder");
            return Ok(Some(self.placeholder()));
        }

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "unsplash search miss");
            return Ok(None);
        }

        match response.json::<SearchResponse>().await {
            Ok(body) => Ok(image_from_search(body)),
            Err(e) => {
                tracing::debug!("undecodable unsplash response: {e}");
                Ok(None)
            }
        }
    }

    fn name(&self) -> &'static str {
        "unsplash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RateBudget;
    use crate::domain::repositories::MockRateBudgetRepository;

    fn provider_with(budget: MockRateBudgetRepository) -> UnsplashProvider {
        UnsplashProvider::new(
            "test-key",
            Arc::new(budget),
            50,
            Duration::hours(1),
            "https://x/placeholder.png",
        )
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_placeholder_without_consuming_quota() {
        let mut budget = MockRateBudgetRepository::new();
        budget.expect_find().times(1).returning(|_| {
            Ok(Some(RateBudget {
                name: BUDGET_NAME.to_string(),
                window_start: Utc::now(),
                request_count: 50,
                last_request: Utc::now(),
            }))
        });
        // No reset, no increment: quota untouched.
        budget.expect_reset().times(0);
        budget.expect_increment().times(0);

        let provider = provider_with(budget);
        let result = provider
            .resolve_image("Anas platyrhynchos", "Mallard")
            .await
            .unwrap();

        assert_eq!(
            result.unwrap().thumbnail_url,
            "https://x/placeholder.png".to_string()
        );
    }

    #[tokio::test]
    async fn test_budget_read_failure_fails_safe_to_placeholder() {
        let mut budget = MockRateBudgetRepository::new();
        budget.expect_find().times(1).returning(|_| {
            Err(crate::error::AppError::internal(
                "Database error",
                serde_json::json!({}),
            ))
        });
        budget.expect_increment().times(0);

        let provider = provider_with(budget);
        let result = provider.resolve_image("", "Mallard").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_empty_names_are_a_miss() {
        let budget = MockRateBudgetRepository::new();
        let provider = provider_with(budget);

        let result = provider.resolve_image("", "").await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_image_from_search_first_hit() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [
                { "urls": { "small": "https://x/small.jpg", "regular": "https://x/regular.jpg" } },
                { "urls": { "small": "https://x/other.jpg" } }
            ]
        }))
        .unwrap();

        let image = image_from_search(body).unwrap();
        assert_eq!(image.thumbnail_url, "https://x/small.jpg");
        assert_eq!(image.original_url.as_deref(), Some("https://x/regular.jpg"));
    }

    #[test]
    fn test_image_from_search_empty_results() {
        let body: SearchResponse =
            serde_json::from_value(serde_json::json!({ "results": [] })).unwrap();
        assert!(image_from_search(body).is_none());
    }
}
