//! Install and activate events.

use super::{ServiceWorker, WorkerState};
use crate::fetch::resolve;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use sisgate_core::{Error, Request, Response};

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub cache_name: String,
    pub stored: usize,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Buckets from previous versions that were removed.
    pub deleted: Vec<String>,
    /// Whether open clients are controlled immediately.
    pub claimed: bool,
}

impl ServiceWorker {
    /// Precache the application shell into the current bucket.
    ///
    /// Every manifest path is fetched concurrently; the entries are written
    /// in a single transaction only if all of them came back 2xx.
    ///
    /// # Errors
    ///
    /// Returns `Error::Precache` naming the first asset that failed. The
    /// worker is then redundant and nothing was stored.
    pub async fn handle_install(&self) -> Result<InstallReport, Error> {
        let _event = self.lifecycle.lock().await;
        let was_controlling = self.is_controlling().await;
        if !was_controlling {
            self.set_state(WorkerState::Installing).await;
        }

        match self.precache().await {
            Ok(stored) => {
                if !was_controlling {
                    self.set_state(WorkerState::Installed).await;
                }
                tracing::info!(cache_name = %self.config.cache_name, stored, "precache complete");
                Ok(InstallReport { cache_name: self.config.cache_name.clone(), stored })
            }
            Err(err) => {
                if !was_controlling {
                    self.set_state(WorkerState::Redundant).await;
                }
                tracing::error!(cache_name = %self.config.cache_name, error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let requests = self
            .config
            .precache
            .iter()
            .map(|path| {
                resolve(&self.config.origin, path)
                    .map(Request::get)
                    .map_err(|e| Error::Precache { url: path.clone(), reason: e.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let responses = try_join_all(requests.iter().map(|request| self.fetch_shell_asset(request))).await?;

        let cache = self.storage.open(&self.config.cache_name).await?;
        let pairs: Vec<(Request, Response)> = requests.into_iter().zip(responses).collect();
        cache.put_all(&pairs).await
    }

    async fn fetch_shell_asset(&self, request: &Request) -> Result<Response, Error> {
        let response = self
            .network
            .fetch(request)
            .await
            .map_err(|e| Error::Precache { url: request.url.to_string(), reason: e.to_string() })?;

        if !response.ok() {
            return Err(Error::Precache { url: request.url.to_string(), reason: format!("status {}", response.status) });
        }
        Ok(response)
    }

    /// Drop every bucket but the current one, then take control.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless the worker is installed (or
    /// already active), and propagates cache errors from the cleanup. A
    /// failed cleanup leaves the worker installed so activation can be retried.
    pub async fn handle_activate(&self) -> Result<ActivateReport, Error> {
        let _event = self.lifecycle.lock().await;
        let state = self.state().await;
        match state {
            WorkerState::Installed | WorkerState::Activated => {}
            other => return Err(Error::InvalidState(format!("cannot activate a worker that is {other}"))),
        }

        if state == WorkerState::Installed {
            self.set_state(WorkerState::Activating).await;
        }

        let deleted = match self.delete_stale_buckets().await {
            Ok(deleted) => deleted,
            Err(err) => {
                if state == WorkerState::Installed {
                    self.set_state(WorkerState::Installed).await;
                }
                return Err(err);
            }
        };

        self.set_state(WorkerState::Activated).await;
        tracing::info!(cache_name = %self.config.cache_name, deleted = deleted.len(), "worker activated");

        Ok(ActivateReport { cache_name: self.config.cache_name.clone(), deleted, claimed: true })
    }

    async fn delete_stale_buckets(&self) -> Result<Vec<String>, Error> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != &self.config.cache_name)
            .collect();

        let removed = try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;

        Ok(stale
            .into_iter()
            .zip(removed)
            .filter_map(|(name, removed)| removed.then_some(name))
            .collect())
    }

    /// Install followed by activate, as run once at startup.
    pub async fn register(&self) -> Result<ActivateReport, Error> {
        self.handle_install().await?;
        self.handle_activate().await
    }
}
