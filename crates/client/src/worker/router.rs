//! Fetch strategies.
//!
//! Cache reads and writes here are best-effort: a failing cache is logged
//! and treated as a miss, and never keeps a good network response from the
//! page.

use super::ServiceWorker;
use super::classify::{Strategy, is_static_asset};
use sisgate_core::{Error, Request, Response};

impl ServiceWorker {
    /// Serve an intercepted request.
    ///
    /// # Errors
    ///
    /// Propagates the network error when neither the network nor the cache
    /// can answer. Failed navigations never error; they fall back to the
    /// cached shell or a synthesized offline page.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, Error> {
        match self.classifier.classify(request) {
            Strategy::Bypass => self.network.fetch(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &Request) -> Result<Response, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store(request, &response).await;
                }
                Ok(response)
            }
            Err(err) => match self.lookup(request).await {
                Some(cached) => {
                    tracing::debug!(url = %request.url, error = %err, "network failed; serving cached API response");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Response, Error> {
        if let Some(cached) = self.lookup(request).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(cached);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() && is_static_asset(&request.url) {
                    self.store(request, &response).await;
                }
                Ok(response)
            }
            Err(err) if request.is_navigation() => {
                tracing::debug!(url = %request.url, error = %err, "navigation failed; serving offline shell");
                Ok(self.offline_shell(request).await)
            }
            Err(err) => Err(err),
        }
    }

    /// Cached application root, or a synthesized offline page when the root
    /// was never stored.
    async fn offline_shell(&self, request: &Request) -> Response {
        let root = Request::get(self.config.root_url());
        match self.lookup(&root).await {
            Some(shell) => shell,
            None => {
                tracing::warn!(url = %request.url, "app shell not cached; serving offline page");
                Response::offline_page(&request.url)
            }
        }
    }

    async fn lookup(&self, request: &Request) -> Option<Response> {
        let result = match self.storage.open(&self.config.cache_name).await {
            Ok(cache) => cache.match_request(request).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    async fn store(&self, request: &Request, response: &Response) {
        let result = match self.storage.open(&self.config.cache_name).await {
            Ok(cache) => cache.put(request, response).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(url = %request.url, error = %e, "cache write failed; response still served");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{StubNetwork, get, test_config, test_worker, test_worker_with_db};
    use sisgate_core::{Request, Response};
    use url::Url;

    #[tokio::test]
    async fn test_rest_success_is_returned_and_stored() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/rest/v1/documents", 200, r#"[{"id":7,"title":"Contrato"}]"#);
        let worker = test_worker(network.clone(), test_config()).await;

        let request = get("https://hub.local/rest/v1/documents");
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.body.as_ref(), br#"[{"id":7,"title":"Contrato"}]"#);
        let cache = worker.storage().open("sisgate-hub-v2").await.unwrap();
        let stored = cache.match_request(&request).await.unwrap().unwrap();
        assert_eq!(stored, response);
    }

    #[tokio::test]
    async fn test_rest_failure_returns_prior_entry() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/rest/v1/reminders", 200, "cached reminders");
        let worker = test_worker(network.clone(), test_config()).await;
        let request = get("https://hub.local/rest/v1/reminders");
        worker.handle_fetch(&request).await.unwrap();

        network.set_offline(true);
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.body.as_ref(), b"cached reminders");
        assert_eq!(network.calls_for("https://hub.local/rest/v1/reminders"), 2);
    }

    #[tokio::test]
    async fn test_rest_failure_without_entry_propagates() {
        let network = StubNetwork::new();
        network.set_offline(true);
        let worker = test_worker(network, test_config()).await;

        let result = worker.handle_fetch(&get("https://hub.local/auth/v1/user")).await;
        assert!(result.unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_rest_error_status_is_served_but_not_stored() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/rest/v1/contacts", 500, "boom");
        let worker = test_worker(network, test_config()).await;

        let request = get("https://hub.local/rest/v1/contacts");
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.status, 500);
        let cache = worker.storage().open("sisgate-hub-v2").await.unwrap();
        assert!(cache.match_request(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_host_is_network_first() {
        let network = StubNetwork::new();
        let url = "https://acme.supabase.co/storage/v1/object/public/avatars/a.png";
        network.serve(url, 200, "v1");
        let worker = test_worker(network.clone(), test_config()).await;
        let request = get(url);

        worker.handle_fetch(&request).await.unwrap();
        network.serve(url, 200, "v2");
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.body.as_ref(), b"v2");
        assert_eq!(network.calls_for(url), 2);
    }

    #[tokio::test]
    async fn test_cached_static_never_hits_network() {
        let network = StubNetwork::new();
        let worker = test_worker(network.clone(), test_config()).await;
        let request = get("https://hub.local/app.js");
        let cache = worker.storage().open("sisgate-hub-v2").await.unwrap();
        cache
            .put(&request, &Response::new("https://hub.local/app.js", 200, "cached js"))
            .await
            .unwrap();

        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.body.as_ref(), b"cached js");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_static_css_miss_is_returned_and_stored() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/assets/app.css", 200, "body{margin:0}");
        let worker = test_worker(network.clone(), test_config()).await;

        let request = get("https://hub.local/assets/app.css");
        let response = worker.handle_fetch(&request).await.unwrap();
        assert_eq!(response.body.as_ref(), b"body{margin:0}");

        let again = worker.handle_fetch(&request).await.unwrap();
        assert_eq!(again, response);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_asset_miss_is_not_stored() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/documents", 200, "<html>docs</html>");
        let worker = test_worker(network.clone(), test_config()).await;

        let request = get("https://hub.local/documents");
        worker.handle_fetch(&request).await.unwrap();
        worker.handle_fetch(&request).await.unwrap();

        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_static_error_status_is_not_stored() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/missing.js", 404, "not found");
        let worker = test_worker(network.clone(), test_config()).await;

        let request = get("https://hub.local/missing.js");
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.status, 404);
        let cache = worker.storage().open("sisgate-hub-v2").await.unwrap();
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_navigation_serves_cached_root() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/", 200, "<html>shell</html>");
        let worker = test_worker(network.clone(), test_config()).await;
        worker.handle_fetch(&get("https://hub.local/")).await.unwrap();

        network.set_offline(true);
        let nav = Request::navigate(Url::parse("https://hub.local/calendar").unwrap());
        let response = worker.handle_fetch(&nav).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body.as_ref(), b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_failed_navigation_without_shell_serves_offline_page() {
        let network = StubNetwork::new();
        network.set_offline(true);
        let worker = test_worker(network, test_config()).await;

        let nav = Request::navigate(Url::parse("https://hub.local/chat").unwrap());
        let response = worker.handle_fetch(&nav).await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.url, "https://hub.local/chat");
    }

    #[tokio::test]
    async fn test_failed_subresource_propagates() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/", 200, "<html>shell</html>");
        let worker = test_worker(network.clone(), test_config()).await;
        worker.handle_fetch(&get("https://hub.local/")).await.unwrap();

        network.set_offline(true);
        let result = worker.handle_fetch(&get("https://hub.local/chunk-9.js")).await;

        assert!(result.unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_post_never_touches_cache() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/rest/documents", 201, "created");
        let worker = test_worker(network.clone(), test_config()).await;

        let request = Request::new("POST", Url::parse("https://hub.local/rest/documents").unwrap())
            .with_header("content-type", "application/json")
            .with_body(r#"{"title":"Proposta"}"#);
        let response = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(network.calls(), 1);
        assert!(worker.storage().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_failure_propagates() {
        let network = StubNetwork::new();
        network.set_offline(true);
        let worker = test_worker(network, test_config()).await;

        let request = Request::new("PATCH", Url::parse("https://hub.local/rest/documents?id=eq.7").unwrap());
        assert!(worker.handle_fetch(&request).await.is_err());
        assert!(worker.storage().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cache_write_still_serves_live_response() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/rest/v1/documents", 200, "live docs");
        network.serve("https://hub.local/assets/app.css", 200, "body{margin:0}");
        let (worker, db) = test_worker_with_db(network.clone(), test_config()).await;
        db.close().await.unwrap();

        let api = worker.handle_fetch(&get("https://hub.local/rest/v1/documents")).await.unwrap();
        assert_eq!(api.body.as_ref(), b"live docs");

        let css = worker.handle_fetch(&get("https://hub.local/assets/app.css")).await.unwrap();
        assert_eq!(css.body.as_ref(), b"body{margin:0}");
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_cache_read_counts_as_miss() {
        let network = StubNetwork::new();
        network.serve("https://hub.local/app.js", 200, "live js");
        let (worker, db) = test_worker_with_db(network.clone(), test_config()).await;
        db.close().await.unwrap();

        let response = worker.handle_fetch(&get("https://hub.local/app.js")).await.unwrap();
        assert_eq!(response.body.as_ref(), b"live js");
        assert_eq!(network.calls_for("https://hub.local/app.js"), 1);

        network.set_offline(true);
        let api = worker.handle_fetch(&get("https://hub.local/rest/v1/reminders")).await;
        assert!(api.unwrap_err().is_network());

        let nav = Request::navigate(Url::parse("https://hub.local/calendar").unwrap());
        let page = worker.handle_fetch(&nav).await.unwrap();
        assert_eq!(page.status, 503);
    }
}
