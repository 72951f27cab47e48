//! Core types and shared functionality for the Sisgate Hub offline worker.
//!
//! This crate provides:
//! - Request/response values shared by the router, network and cache
//! - Versioned cache buckets with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;

pub use cache::{BucketSummary, Cache, CacheDb, CacheStorage};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use message::{Request, RequestMode, Response};
