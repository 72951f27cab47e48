//! Request and response values flowing between the router, the network, and the cache.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Why a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Loads a full document (typed URL, followed link).
    Navigate,
    /// Sub-resource or API call.
    #[default]
    Other,
}

/// An intercepted outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl Request {
    /// Build a request; the method is upper-cased and the fragment dropped.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.to_ascii_uppercase(), url, mode: RequestMode::Other, headers: Vec::new(), body: None }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// A GET issued as a top-level navigation.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response produced by the network or read back from a cache bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// Body served for a navigation that fails while the app shell is not cached.
const OFFLINE_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Offline</title></head>\
<body><h1>Sem conex\u{e3}o</h1><p>Sisgate PRO Hub is offline. Reconnect and reload the page.</p></body></html>";

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Synthesized `503` page for navigations with neither network nor cached shell.
    pub fn offline_page(url: &Url) -> Self {
        Self::new(url.as_str(), 503, OFFLINE_PAGE)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header("cache-control", "no-store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_request_normalizes_method_and_fragment() {
        let req = Request::new("post", url("https://hub.local/rest/documents#top"));
        assert_eq!(req.method, "POST");
        assert_eq!(req.url.as_str(), "https://hub.local/rest/documents");
        assert!(!req.is_get());
    }

    #[test]
    fn test_navigate_mode() {
        let req = Request::navigate(url("https://hub.local/dashboard"));
        assert!(req.is_get());
        assert!(req.is_navigation());
        assert!(!Request::get(url("https://hub.local/app.js")).is_navigation());
    }

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new("https://hub.local/", 200, "").ok());
        assert!(Response::new("https://hub.local/", 204, "").ok());
        assert!(!Response::new("https://hub.local/", 304, "").ok());
        assert!(!Response::new("https://hub.local/", 500, "").ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let res = Response::new("https://hub.local/", 200, "").with_header("Content-Type", "text/css");
        assert_eq!(res.header("content-type"), Some("text/css"));
        assert_eq!(res.header("etag"), None);
    }

    #[test]
    fn test_offline_page() {
        let res = Response::offline_page(&url("https://hub.local/reports"));
        assert_eq!(res.status, 503);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        assert!(String::from_utf8_lossy(&res.body).contains("offline"));
    }
}
