//! SQLite-backed store of versioned cache buckets.
//!
//! Mirrors the browser Cache Storage model: named buckets holding
//! request/response pairs, with no per-entry expiry. Old versions are
//! dropped by deleting the whole bucket.
//!
//! - Entry keys are SHA-256 over method and URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod bucket;
pub mod connection;
pub mod hash;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use bucket::Cache;
pub use connection::CacheDb;
pub use storage::{BucketSummary, CacheStorage};
