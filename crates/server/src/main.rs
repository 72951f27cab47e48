//! sisgate-sw entry point.
//!
//! Builds the offline worker once, registers it (install + activate), and
//! serves its events as MCP tools on stdio. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sisgate_client::{FetchClient, FetchConfig, ServiceWorker, WorkerConfig};
use sisgate_core::{AppConfig, CacheDb, CacheStorage};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(cache_name = %config.cache_name, db_path = %config.db_path.display(), "starting sisgate-sw on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(ServiceWorker::new(
        WorkerConfig::from_app_config(&config)?,
        CacheStorage::new(db.clone()),
        network,
    ));

    match worker.register().await {
        Ok(report) => tracing::info!(deleted = ?report.deleted, "worker registered"),
        Err(e) => tracing::error!(error = %e, "worker registration failed; requests pass through until sw_install succeeds"),
    }

    let handler = handler::HubWorkerServer::new(worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    db.close().await?;
    Ok(())
}
