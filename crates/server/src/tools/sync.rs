//! sw_sync tool implementation.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sisgate_client::ServiceWorker;

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag to fire (default: the worker's registered tag).
    #[serde(default)]
    pub tag: Option<String>,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(worker: &ServiceWorker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.unwrap_or_else(|| worker.config().sync_tag.clone());
    let outcome = worker.handle_sync(&tag).await?;
    json_result(&outcome)
}
