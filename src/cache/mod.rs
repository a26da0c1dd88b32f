//! Cache module for storing the raw API response on disk
//!
//! This module provides a file-backed store that keeps one opaque blob per key
//! and reports the blob's last write time from file metadata. The feed uses a
//! single fixed key, making it a single-slot cache; freshness policy lives with
//! the caller, not here.

mod store;

pub use store::{CacheError, FileCache};
