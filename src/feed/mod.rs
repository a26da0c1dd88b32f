//! Feed fetching, filtering and the cache-backed service
//!
//! This module contains the Instagram API client, the record model with its
//! newest-first time filter, and `FeedService`, which ties them to the cache.

pub mod client;
pub mod record;
pub mod service;

pub use client::{FeedSource, InstagramClient};
pub use record::{
    filter_by_time, filter_payload, has_feed_shape, parse_feed, FeedRecord, FilterResult,
};
pub use service::{is_within_lifetime, FeedError, FeedService, PayloadValidator};
