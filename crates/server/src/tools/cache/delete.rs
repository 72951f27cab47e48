//! cache_delete tool implementation.
//!
//! Removes a whole bucket, the only eviction the store supports.

use crate::error::ToolError;
use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sisgate_client::ServiceWorker;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Bucket name to delete.
    pub name: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheDeleteOutput {
    pub name: String,
    /// False when no bucket had that name.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(worker: &ServiceWorker, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    if params.name.trim().is_empty() {
        return Err(ToolError::InvalidInput("name cannot be empty".into()).into());
    }

    if params.name == worker.config().cache_name {
        tracing::warn!(name = %params.name, "deleting the current bucket; offline shell is gone until reinstall");
    }

    let deleted = worker.storage().delete(&params.name).await?;
    json_result(&CacheDeleteOutput { name: params.name, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, output, worker};

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let worker = worker(StubNetwork::new()).await;
        worker.storage().open("sisgate-hub-v1").await.unwrap();

        let params = CacheDeleteParams { name: "sisgate-hub-v1".into() };
        let out: CacheDeleteOutput = output(&delete_impl(&worker, params.clone()).await.unwrap());
        assert!(out.deleted);

        let out: CacheDeleteOutput = output(&delete_impl(&worker, params).await.unwrap());
        assert!(!out.deleted);
    }

    #[tokio::test]
    async fn test_delete_no_name() {
        let worker = worker(StubNetwork::new()).await;
        let params = CacheDeleteParams { name: " ".into() };
        assert!(delete_impl(&worker, params).await.is_err());
    }
}
