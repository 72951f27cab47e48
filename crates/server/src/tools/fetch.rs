//! sw_fetch tool implementation.
//!
//! Hands a page request to the worker, exactly as an intercepted fetch.

use super::json_result;
use crate::error::ToolError;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sisgate_client::{ServiceWorker, resolve};
use sisgate_core::{Error, Request, RequestMode};
use std::collections::BTreeMap;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// URL to request; root-relative paths resolve against the app origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate" for full page loads, "other" (default) otherwise.
    #[serde(default)]
    pub mode: RequestMode,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, sent as-is.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwFetchOutput {
    /// URL of the response (after redirects, or as stored).
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    /// Whether the worker intercepted the request.
    pub controlled: bool,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&worker.config().origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let mut request = Request::new(&params.method, url);
    if params.mode == RequestMode::Navigate {
        if !request.is_get() {
            return Err(ToolError::InvalidInput(format!("navigation must use GET, got {}", request.method)).into());
        }
        request.mode = RequestMode::Navigate;
    }
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    let controlled = worker.is_controlling().await;
    let response = worker.dispatch_fetch(&request).await?;

    json_result(&SwFetchOutput {
        url: response.url,
        status: response.status,
        headers: response.headers,
        body: String::from_utf8_lossy(&response.body).into_owned(),
        body_bytes: response.body.len(),
        controlled,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{StubNetwork, output, worker};
    use super::*;

    fn params(url: &str) -> SwFetchParams {
        SwFetchParams {
            url: url.into(),
            method: "GET".into(),
            mode: RequestMode::Other,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let worker = worker(StubNetwork::new()).await;
        let result = fetch_impl(&worker, params("")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_navigation_must_be_get() {
        let worker = worker(StubNetwork::new()).await;
        let p = SwFetchParams { method: "POST".into(), mode: RequestMode::Navigate, ..params("/") };
        let err = fetch_impl(&worker, p).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_uncontrolled_fetch_passes_through() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/app.js", 200, "live");
        let worker = worker(network).await;

        let out: SwFetchOutput = output(&fetch_impl(&worker, params("/app.js")).await.unwrap());
        assert_eq!(out.body, "live");
        assert!(!out.controlled);
        assert!(worker.storage().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_controlled_navigation_falls_back_to_shell() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/", 200, "<html>shell</html>");
        let worker = worker(network.clone()).await;
        worker.register().await.unwrap();

        network.set_offline(true);
        let p = SwFetchParams { mode: RequestMode::Navigate, ..params("/documents/42") };
        let out: SwFetchOutput = output(&fetch_impl(&worker, p).await.unwrap());

        assert!(out.controlled);
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "<html>shell</html>");
    }

    #[test]
    fn test_params_defaults() {
        let p: SwFetchParams = serde_json::from_str(r#"{"url":"/rest/v1/documents"}"#).unwrap();
        assert_eq!(p.method, "GET");
        assert_eq!(p.mode, RequestMode::Other);
        assert!(p.headers.is_empty());
    }
}
