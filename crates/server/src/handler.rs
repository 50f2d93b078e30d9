//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to
//! the appropriate implementations. Pages are loaded into a single
//! headless tab; each call holds a capture session on that tab for its
//! whole duration.
use std::sync::Arc;

use crate::tools::{PageCaptureParams, PageSummarizeParams, parse_target_url};
#[cfg(feature = "render")]
use crate::{
    browser::BrowserSlot,
    session::{SessionGuard, SharedPanels},
    tools::{page_capture::capture_impl, page_summarize::summarize_impl},
};

#[cfg(feature = "render")]
use pagelens_client::{ChromeHost, PageUrl, RenderOptions};
use pagelens_client::Summarizer;
use pagelens_core::{AppConfig, Error};
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

#[cfg_attr(not(feature = "render"), allow(dead_code))]
struct ServerState {
    summarizer: Summarizer,
    #[cfg(feature = "render")]
    browser: BrowserSlot,
    #[cfg(feature = "render")]
    panels: SharedPanels,
}

/// The main MCP server handler for pagelens.
#[derive(Clone)]
pub struct PageLensServer {
    tool_router: ToolRouter<Self>,
    state: Arc<ServerState>,
}

impl PageLensServer {
    /// Create a new server handler.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        #[cfg(feature = "render")]
        let browser = BrowserSlot::new(RenderOptions::from(&config));

        let state = ServerState {
            summarizer: Summarizer::from_config(config)?,
            #[cfg(feature = "render")]
            browser,
            #[cfg(feature = "render")]
            panels: SharedPanels::default(),
        };
        Ok(Self { tool_router: Self::tool_router(), state: Arc::new(state) })
    }

    /// Load `url` into the headless tab and hold a capture session on it.
    #[cfg(feature = "render")]
    async fn open_page(&self, url: &PageUrl) -> Result<(ChromeHost, SessionGuard), Error> {
        if !self.state.summarizer.config().render_enabled {
            return Err(Error::RenderDisabled);
        }

        let (host, tab) = self.state.browser.tab().await?;
        let session = SessionGuard::acquire(&self.state.panels, &tab)?;
        host.navigate(url.as_str()).await?;
        tracing::debug!(tab = session.tab(), url = %url, "page opened");
        Ok((host, session))
    }
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PageLensServer {
    /// Summarize a page.
    ///
    /// The page is loaded in a headless browser, captured (PDF text, DOM and
    /// scrolled screenshots) and sent to the configured summarization service.
    #[tool(description = "Summarize a web page or PDF. Loads the URL in a headless browser, captures its \
                          content and returns the summary from the summarization service.")]
    async fn page_summarize(&self, params: Parameters<PageSummarizeParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let url = parse_target_url(&params.url)?;

        #[cfg(feature = "render")]
        {
            let (host, _session) = self.open_page(&url).await?;
            summarize_impl(&self.state.summarizer, &host, params).await
        }

        #[cfg(not(feature = "render"))]
        {
            tracing::warn!(url = %url, "page_summarize called without render support");
            Err(Error::RenderDisabled.into())
        }
    }

    /// Capture a page without summarizing it.
    #[tool(description = "Capture a web page or PDF without summarizing. Returns the capture strategy, \
                          content channel and frame count, optionally with the frames.")]
    async fn page_capture(&self, params: Parameters<PageCaptureParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let url = parse_target_url(&params.url)?;

        #[cfg(feature = "render")]
        {
            let (host, _session) = self.open_page(&url).await?;
            capture_impl(&self.state.summarizer, &host, params).await
        }

        #[cfg(not(feature = "render"))]
        {
            tracing::warn!(url = %url, "page_capture called without render support");
            Err(Error::RenderDisabled.into())
        }
    }
}

impl ServerHandler for PageLensServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagelens-mcp".into(),
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
