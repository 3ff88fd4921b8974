//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::web_extract::{WebExtractParams, extract_impl};
use crate::tools::web_scrape::{WebScrapeParams, scrape_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use scrapbook_client::Scraper;

/// The main MCP server handler for scrapbook.
#[derive(Clone)]
pub struct ScrapbookServer {
    scraper: Scraper,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ScrapbookServer {
    /// Create a new server handler around a shared scraper.
    pub fn new(scraper: Scraper) -> Self {
        Self { scraper, tool_router: Self::tool_router() }
    }

    /// Fetch a URL and extract an entry draft from it.
    #[tool(
        description = "Fetch a web page and extract a bookmark entry draft. Returns JSON with title, content, imageUrl, url and tags."
    )]
    async fn web_scrape(&self, params: Parameters<WebScrapeParams>) -> Result<CallToolResult, McpError> {
        scrape_impl(&self.scraper, params.0).await
    }

    /// Extract an entry draft from caller-supplied HTML.
    ///
    /// No network requests are made.
    #[tool(
        description = "Extract a bookmark entry draft from raw HTML without fetching. Returns JSON with title, content, imageUrl, url and tags."
    )]
    async fn web_extract(&self, params: Parameters<WebExtractParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.scraper, params.0).await
    }
}

impl ServerHandler for ScrapbookServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "scrapbook".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
