//! Cache inspection tools.
//!
//! This module provides tools for looking into and removing cache buckets.

pub mod delete;
pub mod get;
pub mod list;

pub use delete::{CacheDeleteParams, delete_impl};
pub use get::{CacheGetParams, get_impl};
pub use list::list_impl;
