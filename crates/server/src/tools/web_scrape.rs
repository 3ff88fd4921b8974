//! web_scrape tool implementation.
//!
//! Fetches a URL and extracts an entry draft using the full fetch pipeline.
//! Any failure is returned as a single tool error; the caller falls back to
//! manual entry.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use scrapbook_client::Scraper;
use scrapbook_core::Error;
use serde::{Deserialize, Serialize};

use super::record_result;

/// Input parameters for web_scrape tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebScrapeParams {
    /// Absolute http(s) URL of the page to scrape.
    pub url: String,
}

/// Implementation of the web_scrape tool.
pub async fn scrape_impl(scraper: &Scraper, params: WebScrapeParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    match scraper.extract(&params.url).await {
        Ok(record) => Ok(record_result(&record)),
        Err(err) => {
            tracing::warn!(url = %params.url, error = %err, "failed to scrape URL");
            Err(err.into())
        }
    }
}
