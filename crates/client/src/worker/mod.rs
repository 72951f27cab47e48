//! Offline worker: lifecycle, fetch routing and the deferred-sync hook.
//!
//! ### Lifecycle
//! - `install` precaches the application shell into the current bucket,
//!   all-or-nothing.
//! - `activate` drops every bucket from older versions and claims clients.
//!
//! ### Fetch routing
//! - Non-GET: bypass, straight to the network.
//! - Backend API calls: network-first with cache fallback.
//! - Everything else: cache-first, with the cached app shell as the
//!   offline fallback for navigations.
//!
//! One [`ServiceWorker`] is built per process; the host dispatches events to
//! its `handle_*` methods. Requests run as independent tasks and never
//! coordinate, so concurrent writes of the same entry are last-write-wins.
//! Install and activate events are serialized against each other.

pub mod classify;
pub mod lifecycle;
pub mod router;
pub mod sync;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use classify::{Classifier, Strategy, is_static_asset};
pub use lifecycle::{ActivateReport, InstallReport};
pub use sync::SyncOutcome;

use crate::fetch::Network;
use serde::{Deserialize, Serialize};
use sisgate_core::{AppConfig, CacheStorage, Error, Request, Response};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use url::Url;

/// Settings the worker needs, resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Current bucket name.
    pub cache_name: String,
    /// Origin the precache paths resolve against.
    pub origin: Url,
    /// Root-relative shell paths stored at install.
    pub precache: Vec<String>,
    /// Host substrings that mark backend API calls.
    pub api_host_markers: Vec<String>,
    /// Background-sync tag.
    pub sync_tag: String,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config
            .origin_url()
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            cache_name: config.cache_name.clone(),
            origin,
            precache: config.precache.clone(),
            api_host_markers: config.api_host_markers.clone(),
            sync_tag: config.sync_tag.clone(),
        })
    }

    /// URL of the application root, used as the offline shell.
    pub fn root_url(&self) -> Url {
        let mut root = self.origin.clone();
        root.set_path("/");
        root.set_query(None);
        root
    }
}

/// Where the worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; needs a fresh install.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// The worker object, constructed once and shared across request tasks.
pub struct ServiceWorker {
    config: WorkerConfig,
    storage: CacheStorage,
    network: Arc<dyn Network>,
    classifier: Classifier,
    state: RwLock<WorkerState>,
    /// Held for the whole of an install or activate event so the two never interleave.
    lifecycle: Mutex<()>,
}

impl ServiceWorker {
    pub fn new(config: WorkerConfig, storage: CacheStorage, network: Arc<dyn Network>) -> Self {
        let classifier = Classifier::new(config.api_host_markers.clone());
        Self {
            config,
            storage,
            network,
            classifier,
            state: RwLock::new(WorkerState::Parsed),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Only an activated worker intercepts requests.
    pub async fn is_controlling(&self) -> bool {
        self.state().await == WorkerState::Activated
    }

    pub(crate) async fn set_state(&self, next: WorkerState) -> WorkerState {
        let mut state = self.state.write().await;
        let previous = *state;
        *state = next;
        if previous != next {
            tracing::info!(from = %previous, to = %next, cache_name = %self.config.cache_name, "worker state changed");
        }
        previous
    }

    /// Entry point for a page request.
    ///
    /// Routed through [`ServiceWorker::handle_fetch`] once the worker controls
    /// the page; before that the request goes to the network untouched.
    pub async fn dispatch_fetch(&self, request: &Request) -> Result<Response, Error> {
        if self.is_controlling().await {
            self.handle_fetch(request).await
        } else {
            tracing::debug!(url = %request.url, "worker not controlling; passing through");
            self.network.fetch(request).await
        }
    }
}
