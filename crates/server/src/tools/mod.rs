//! MCP tool implementations.
//!
//! This module contains all tools exposed by the scrapbook server.

pub mod web_extract;
pub mod web_scrape;

use rmcp::model::{CallToolResult, Content};
use scrapbook_client::ExtractionResult;

/// Wrap an extracted record as a successful tool result.
pub(crate) fn record_result(record: &ExtractionResult) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(record).unwrap_or_default())])
}
