//! MCP tool implementations.
//!
//! Each tool forwards one worker event (install, activate, fetch, sync) or
//! inspects the cache buckets.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod sync;

pub use fetch::SwFetchParams;
pub use sync::SwSyncParams;

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Render tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use sisgate_client::{ServiceWorker, WorkerConfig};
    use sisgate_core::{CacheDb, CacheStorage};
    use std::sync::Arc;
    use url::Url;

    pub use sisgate_client::worker::testing::StubNetwork;

    pub async fn worker(network: Arc<StubNetwork>) -> ServiceWorker {
        let config = WorkerConfig {
            cache_name: "sisgate-hub-v3".into(),
            origin: Url::parse("https://hub.local").unwrap(),
            precache: vec!["/".into()],
            api_host_markers: vec!["supabase.co".into()],
            sync_tag: "sync-pending-changes".into(),
        };
        let storage = CacheStorage::new(CacheDb::open_in_memory().await.unwrap());
        ServiceWorker::new(config, storage, network)
    }

    /// Decode the JSON text of a tool result.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
