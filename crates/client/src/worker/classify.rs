//! Request classification.
//!
//! Pure functions of method, scheme, host and path; nothing here touches the
//! network or the cache.

use regex::Regex;
use sisgate_core::Request;
use std::sync::LazyLock;
use url::Url;

/// Path prefixes reserved for the backend's REST and auth endpoints.
const REMOTE_PATH_PREFIXES: &[&str] = &["/rest/", "/auth/"];

/// Script, stylesheet, image and font suffixes worth keeping offline.
static STATIC_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:js|mjs|css|png|jpe?g|gif|svg|webp|ico|woff2?|ttf|otf|eot)$").expect("static asset pattern")
});

/// How an intercepted request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Live network, cached copy only when the network fails.
    NetworkFirst,
    /// Cached copy, network only on a miss.
    CacheFirst,
    /// Not intercepted; goes straight to the network.
    Bypass,
}

/// Classification rules for one worker.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_host_markers: Vec<String>,
}

impl Classifier {
    pub fn new(api_host_markers: Vec<String>) -> Self {
        Self { api_host_markers }
    }

    pub fn classify(&self, request: &Request) -> Strategy {
        if !request.is_get() || !matches!(request.url.scheme(), "http" | "https") {
            return Strategy::Bypass;
        }
        if self.is_remote_data(&request.url) {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }

    /// Backend host marker in the hostname, or a REST/auth path prefix.
    pub fn is_remote_data(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        self.api_host_markers.iter().any(|marker| host.contains(marker.as_str()))
            || REMOTE_PATH_PREFIXES.iter().any(|prefix| url.path().starts_with(prefix))
    }
}

/// Whether a cache-first miss for this URL may be stored.
///
/// The caller still has to check that the response was successful.
pub fn is_static_asset(url: &Url) -> bool {
    let path = url.path();
    path == "/" || STATIC_ASSET.is_match(path)
}
