//! sw_install and sw_activate tool implementations.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use sisgate_client::{ServiceWorker, WorkerState};

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwInstallOutput {
    pub cache_name: String,
    pub stored: usize,
    pub state: WorkerState,
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwActivateOutput {
    pub cache_name: String,
    pub deleted: Vec<String>,
    pub claimed: bool,
    pub state: WorkerState,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let report = worker.handle_install().await?;
    json_result(&SwInstallOutput { cache_name: report.cache_name, stored: report.stored, state: worker.state().await })
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let report = worker.handle_activate().await?;
    json_result(&SwActivateOutput {
        cache_name: report.cache_name,
        deleted: report.deleted,
        claimed: report.claimed,
        state: worker.state().await,
    })
}
