//! instafeed library
//!
//! Fetches a user's recent Instagram media and serves it through a single-slot
//! on-disk cache, filtered to records newer than a caller-supplied timestamp.

pub mod cache;
pub mod cli;
pub mod config;
pub mod feed;

pub use cache::{CacheError, FileCache};
pub use config::{FeedConfig, FetchErrorPolicy};
pub use feed::{FeedError, FeedRecord, FeedService, FilterResult};
