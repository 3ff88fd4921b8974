//! URL-to-record extraction engine.
//!
//! `Scraper::extract` is the whole contract: fetch the page, decode it, run
//! the extraction rules. Retrieval and parse failures abort the call; every
//! field-level gap is absorbed as an empty value.

use std::sync::Arc;

use scrapbook_core::{AppConfig, Error};
use tokio_util::sync::CancellationToken;

use crate::extract::{ExtractionResult, Extractor, RuleExtractor};
use crate::fetch::{FetchClient, FetchConfig, FetchResponse};

/// Fetches pages and extracts a record from each.
///
/// Holds only the HTTP connection pool and the rule set; calls are
/// independent and may run concurrently on a shared instance.
#[derive(Clone)]
pub struct Scraper {
    fetch: FetchClient,
    extractor: Arc<dyn Extractor>,
}

impl Scraper {
    /// Create a scraper with the built-in rules.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        Self::with_extractor(config, Arc::new(RuleExtractor::new()))
    }

    /// Create a scraper from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(FetchConfig::from(config))
    }

    /// Create a scraper with a custom extractor.
    pub fn with_extractor(config: FetchConfig, extractor: Arc<dyn Extractor>) -> Result<Self, Error> {
        Ok(Self { fetch: FetchClient::new(config)?, extractor })
    }

    /// Fetch `url` and extract its record.
    ///
    /// `source_url` in the result is `url` exactly as given.
    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, Error> {
        let response = self.fetch.fetch(url).await?;
        self.extract_response(url, &response)
    }

    /// Like [`Scraper::extract`], aborting retrieval when `cancel` fires.
    pub async fn extract_with_cancel(&self, url: &str, cancel: &CancellationToken) -> Result<ExtractionResult, Error> {
        let response = self.fetch.fetch_with_cancel(url, cancel).await?;
        self.extract_response(url, &response)
    }

    /// Extract a record from HTML the caller already has.
    pub fn extract_html(&self, html: &str, source_url: &str) -> Result<ExtractionResult, Error> {
        self.extractor.extract(html, source_url)
    }

    fn extract_response(&self, url: &str, response: &FetchResponse) -> Result<ExtractionResult, Error> {
        let html = response.text();
        let result = self.extractor.extract(&html, url)?;

        tracing::debug!(
            url = %response.url,
            final_url = %response.final_url,
            fetch_ms = response.fetch_ms,
            "scraped page"
        );

        Ok(result)
    }

    /// Get reference to the fetch client.
    pub fn fetch_client(&self) -> &FetchClient {
        &self.fetch
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper").field("fetch", &self.fetch).finish_non_exhaustive()
    }
}
