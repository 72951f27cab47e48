//! cache_get tool implementation.
//!
//! Reads the stored response for a URL from the current bucket.

use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sisgate_client::{ServiceWorker, resolve};
use sisgate_core::{Error, Request};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the cached GET request; root-relative paths resolve against the app origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetOutput {
    pub cache_name: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &ServiceWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&worker.config().origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let cache_name = worker.config().cache_name.clone();

    let cache = worker.storage().open(&cache_name).await?;
    let response = cache
        .match_request(&Request::get(url.clone()))
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    json_result(&CacheGetOutput {
        cache_name,
        url: response.url,
        status: response.status,
        headers: response.headers,
        body: String::from_utf8_lossy(&response.body).into_owned(),
        body_bytes: response.body.len(),
    })
}
