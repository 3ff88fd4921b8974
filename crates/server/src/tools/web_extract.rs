//! web_extract tool implementation.
//!
//! This tool extracts an entry draft from HTML supplied by the client.
//! No network I/O is performed.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use scrapbook_client::Scraper;
use scrapbook_core::Error;
use serde::{Deserialize, Serialize};

use super::record_result;

/// Input parameters for web_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebExtractParams {
    /// The raw HTML content to extract from.
    pub html: String,

    /// URL the HTML was retrieved from, echoed back as `url` (optional).
    #[serde(default)]
    pub url: Option<String>,
}

/// Implementation of the web_extract tool.
pub async fn extract_impl(scraper: &Scraper, params: WebExtractParams) -> Result<CallToolResult, McpError> {
    if params.html.is_empty() {
        return Err(Error::InvalidInput("html cannot be empty".into()).into());
    }

    let record = scraper.extract_html(&params.html, params.url.as_deref().unwrap_or_default())?;

    Ok(record_result(&record))
}
