//! Client code for the Sisgate Hub offline worker.
//!
//! This crate provides the HTTP network client and the worker that routes
//! intercepted requests between the network and the cache buckets.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network, UrlError, resolve};

pub use worker::{
    ActivateReport, Classifier, InstallReport, ServiceWorker, Strategy, SyncOutcome, WorkerConfig, WorkerState,
    is_static_asset,
};
