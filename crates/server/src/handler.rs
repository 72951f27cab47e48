//! MCP server handler implementation.
//!
//! The tool router is the worker's event dispatch table: each lifecycle or
//! fetch event arrives as a tool call and is forwarded to the single
//! [`ServiceWorker`] built at startup.
use crate::tools::{
    SwFetchParams, SwSyncParams,
    cache::{CacheDeleteParams, CacheGetParams, delete_impl, get_impl, list_impl},
    fetch::fetch_impl,
    lifecycle::{activate_impl, install_impl},
    sync::sync_impl,
};
use sisgate_client::ServiceWorker;
use std::sync::Arc;

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

/// The main MCP server handler for the offline worker.
#[derive(Clone)]
pub struct HubWorkerServer {
    worker: Arc<ServiceWorker>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HubWorkerServer {
    /// Create a new server handler around an already-built worker.
    pub fn new(worker: Arc<ServiceWorker>) -> Self {
        Self { worker, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install event: precache the app shell into the current cache bucket. All-or-nothing.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate event: delete cache buckets from older versions and take control of requests.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Route a request through the worker.
    ///
    /// API calls are network-first, other GETs cache-first, everything else
    /// goes straight to the network.
    #[tool(
        description = "Fetch event: route a request through the worker (network-first for API calls, cache-first for assets, offline shell for failed navigations)."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Sync event: fire a background-sync tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache buckets with their entry counts and the worker state.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.worker).await
    }

    #[tool(description = "Read the stored response for a GET URL from the current cache bucket.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete a whole cache bucket by name.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for HubWorkerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sisgate-sw".into(),
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
