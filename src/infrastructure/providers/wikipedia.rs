//! Wikipedia REST summary adapter.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use super::{ImageProvider, ProviderError, ResolvedImage};

/// Image lookup against the Wikipedia page-summary API.
///
/// Two-step lookup: scientific name first (article titles for birds are
/// usually the binomial name), common name as the fallback. The usage
/// policy requires an identifying `User-Agent` on every request.
pub struct WikipediaProvider {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

/// Relevant subset of the page-summary response.
#[derive(Debug, Deserialize)]
pub(crate) struct PageSummary {
    thumbnail: Option<ImageRef>,
    originalimage: Option<ImageRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    source: String,
}

impl WikipediaProvider {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Fetches the page summary for one title.
    ///
    /// Non-success statuses and undecodable bodies are uniform misses;
    /// only failures to reach the API at all surface as transport errors.
    async fn summary_lookup(&self, title: &str) -> Result<Option<ResolvedImage>, ProviderError> {
        let encoded = urlencoding::encode(&title.replace(' ', "_")).into_owned();
        let url = format!("{}/page/summary/{}", self.base_url, encoded);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(title, status = %response.status(), "wikipedia summary miss");
            return Ok(None);
        }

        match response.json::<PageSummary>().await {
            Ok(summary) => Ok(image_from_summary(summary)),
            Err(e) => {
                tracing::debug!(title, "undecodable wikipedia summary: {e}");
                Ok(None)
            }
        }
    }
}

/// Extracts image URLs from a summary; the thumbnail is mandatory.
pub(crate) fn image_from_summary(summary: PageSummary) -> Option<ResolvedImage> {
    let thumbnail = summary.thumbnail?;
    Some(ResolvedImage {
        thumbnail_url: thumbnail.source,
        original_url: summary.originalimage.map(|i| i.source),
    })
}

#[async_trait]
impl ImageProvider for WikipediaProvider {
    async fn resolve_image(
        &self,
        sci_name: &str,
        com_name: &str,
    ) -> Result<Option<ResolvedImage>, ProviderError> {
        if !sci_name.is_empty()
            && let Some(image) = self.summary_lookup(sci_name).await?
        {
            return Ok(Some(image));
        }

        if !com_name.is_empty() {
            return self.summary_lookup(com_name).await;
        }

        Ok(None)
    }

    fn name(&self) -> &'static str {
        "wikipedia"
    }
}
