//! Deferred-sync hook.

use super::ServiceWorker;
use serde::{Deserialize, Serialize};
use sisgate_core::Error;

/// What a sync event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SyncOutcome {
    /// The registered tag ran; `replayed` mutations were sent.
    Completed { replayed: usize },
    /// The tag is not one this worker registered.
    Ignored,
}

impl ServiceWorker {
    /// Run a background-sync event.
    ///
    /// No mutations are queued while offline yet, so the registered tag
    /// completes immediately with nothing replayed.
    pub async fn handle_sync(&self, tag: &str) -> Result<SyncOutcome, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return Ok(SyncOutcome::Ignored);
        }

        // TODO: persist failed non-GET requests to an outbox table and replay them here.
        tracing::info!(tag, "background sync ran; no pending changes");
        Ok(SyncOutcome::Completed { replayed: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{StubNetwork, test_config, test_worker};
    use super::*;

    #[tokio::test]
    async fn test_registered_tag_completes() {
        let network = StubNetwork::new();
        let worker = test_worker(network.clone(), test_config()).await;

        let outcome = worker.handle_sync("sync-pending-changes").await.unwrap();

        assert_eq!(outcome, SyncOutcome::Completed { replayed: 0 });
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_ignored() {
        let worker = test_worker(StubNetwork::new(), test_config()).await;
        assert_eq!(worker.handle_sync("other").await.unwrap(), SyncOutcome::Ignored);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&SyncOutcome::Completed { replayed: 0 }).unwrap();
        assert_eq!(json, r#"{"outcome":"completed","replayed":0}"#);
    }
}
