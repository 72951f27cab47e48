//! Stub network and fixtures shared by the worker tests and, behind the
//! `test-util` feature, by dependent crates.

use super::{ServiceWorker, WorkerConfig};
use crate::fetch::Network;
use sisgate_core::{CacheDb, CacheStorage, Error, Request, Response};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Serves canned responses by URL and records every request it sees.
#[derive(Default)]
pub struct StubNetwork {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    latency_ms: AtomicU64,
}

impl StubNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Response::new(url, status, body.to_string()));
    }

    /// Serve every path in [`test_config`]'s precache manifest.
    pub fn serve_shell(&self) {
        self.serve("https://hub.local/", 200, "<html>shell</html>");
        self.serve("https://hub.local/index.html", 200, "<html>index</html>");
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every response, to hold a fetch open while another event runs.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.url.to_string());
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        self.routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("connection refused: {}", request.url)))
    }
}

pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        cache_name: "sisgate-hub-v2".into(),
        origin: Url::parse("https://hub.local").unwrap(),
        precache: vec!["/".into(), "/index.html".into()],
        api_host_markers: vec!["supabase.co".into()],
        sync_tag: "sync-pending-changes".into(),
    }
}

pub async fn test_worker(network: Arc<StubNetwork>, config: WorkerConfig) -> ServiceWorker {
    test_worker_with_db(network, config).await.0
}

/// Like [`test_worker`], also handing back the database so a test can close it.
pub async fn test_worker_with_db(network: Arc<StubNetwork>, config: WorkerConfig) -> (ServiceWorker, CacheDb) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = ServiceWorker::new(config, CacheStorage::new(db.clone()), network);
    (worker, db)
}

pub fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}
