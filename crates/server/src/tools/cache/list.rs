//! cache_list tool implementation.

use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use sisgate_client::{ServiceWorker, WorkerState};
use sisgate_core::BucketSummary;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheListOutput {
    /// Bucket the worker reads and writes.
    pub current: String,
    pub state: WorkerState,
    pub buckets: Vec<BucketSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let buckets = worker.storage().summaries().await?;
    json_result(&CacheListOutput { current: worker.config().cache_name.clone(), state: worker.state().await, buckets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, output, worker};

    #[tokio::test]
    async fn test_list_after_install() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/", 200, "<html>shell</html>");
        let worker = worker(network).await;
        worker.storage().open("sisgate-hub-v1").await.unwrap();
        worker.handle_install().await.unwrap();

        let out: CacheListOutput = output(&list_impl(&worker).await.unwrap());

        assert_eq!(out.current, "sisgate-hub-v3");
        assert_eq!(out.state, WorkerState::Installed);
        assert_eq!(out.buckets.len(), 2);
        assert_eq!(out.buckets[1].name, "sisgate-hub-v3");
        assert_eq!(out.buckets[1].entries, 1);
    }
}
