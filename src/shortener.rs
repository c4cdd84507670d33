//! Client for the external link shortening provider
//!
//! Each download link is sent to the provider as
//! `GET <base>?api=<token>&url=<link>` and the provider answers with
//! `{"shortenedUrl": "..."}`.
//!
//! Fallback policy: shortening is best effort. Any failure for a link
//! (connection error, timeout, a body that is not JSON, a missing or empty
//! `shortenedUrl`) is logged and that link's short URL becomes its original
//! URL. Failures are never retried and never abort the remaining links.
//!
//! Concurrency policy: at most `concurrency` provider requests are in flight
//! per call to [`LinkShortener::shorten`]. With the default of 1 links are
//! shortened strictly one after another. Output order always matches input
//! order.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ShortenerConfig;
use crate::model::{DownloadLink, ShortLink};

/// Why a single link could not be shortened
///
/// Only ever logged; callers of [`LinkShortener::shorten`] never see it.
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider response has no shortenedUrl")]
    MissingShortUrl,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(rename = "shortenedUrl")]
    shortened_url: Option<String>,
}

/// Shortens download links through the configured provider
#[derive(Debug, Clone)]
pub struct LinkShortener {
    client: Client,
    base_url: String,
    api_token: String,
    concurrency: usize,
}

impl LinkShortener {
    pub fn new(config: &ShortenerConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim().to_string(),
            api_token: config.api_token.clone(),
            concurrency: config.concurrency.max(1),
        }
    }

    /// Produces one short link per download link, in the same order
    ///
    /// Links whose url is blank are skipped; canonical links from
    /// [`crate::links::normalize`] never are.
    pub async fn shorten(&self, links: &[DownloadLink]) -> Vec<ShortLink> {
        // No borrowing closures inside the stream: handler futures must stay Send
        let pending: Vec<_> = links
            .iter()
            .filter(|link| !link.url.trim().is_empty())
            .cloned()
            .map(|link| self.shorten_link(link))
            .collect();

        stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn shorten_link(&self, link: DownloadLink) -> ShortLink {
        match self.request_short_url(&link.url).await {
            Ok(short_url) => {
                tracing::debug!(url = %link.url, short_url = %short_url, "link shortened");
                ShortLink::shortened(&link, short_url)
            }
            Err(err) => {
                tracing::warn!(url = %link.url, error = %err, "link shortening failed, keeping original url");
                ShortLink::fallback(&link)
            }
        }
    }

    async fn request_short_url(&self, url: &str) -> Result<String, ShortenError> {
        let response: ProviderResponse = self
            .client
            .get(&self.base_url)
            .query(&[("api", self.api_token.as_str()), ("url", url)])
            .send()
            .await?
            .json()
            .await?;

        response
            .shortened_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ShortenError::MissingShortUrl)
    }
}
