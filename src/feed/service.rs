//! Fetch-or-serve orchestration over the single-slot feed cache
//!
//! Per request: check freshness, fetch and replace the cache if stale, then
//! read the cached blob and filter it by the caller's threshold.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::{FeedSource, InstagramClient};
use super::record::{filter_payload, has_feed_shape, FilterResult};
use crate::cache::{CacheError, FileCache};
use crate::config::{FeedConfig, FetchErrorPolicy};

/// Predicate deciding whether a fetched payload may replace the cache
pub type PayloadValidator = fn(&[u8]) -> bool;

/// Errors returned by `FeedService`
#[derive(Debug, Error)]
pub enum FeedError {
    /// The cache could not be written or read
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The remote API could not be reached or the transfer failed
    #[error("Feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote API answered with an empty body
    #[error("Feed API returned an empty response")]
    EmptyResponse,
}

/// Serves a user's feed from cache, refreshing it when it gets too old
#[derive(Debug)]
pub struct FeedService<S = InstagramClient> {
    config: FeedConfig,
    cache: FileCache,
    source: S,
    validator: Option<PayloadValidator>,
    /// Held while refreshing so concurrent stale requests share one fetch
    refresh_lock: Mutex<()>,
}

impl FeedService<InstagramClient> {
    /// Creates a service talking to the Instagram API described by `config`
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let source = InstagramClient::from_config(&config)?;
        Ok(Self::with_source(config, source))
    }
}

impl<S: FeedSource> FeedService<S> {
    /// Creates a service with a custom feed source
    ///
    /// Payload validation is enabled when `config.validate_payload` is set.
    pub fn with_source(config: FeedConfig, source: S) -> Self {
        let cache = FileCache::with_dir(&config.cache_dir);
        let validator = config
            .validate_payload
            .then_some(has_feed_shape as PayloadValidator);
        Self {
            config,
            cache,
            source,
            validator,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Replaces the validation hook run before a fetched payload is cached
    pub fn with_validator(mut self, validator: PayloadValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Returns when the cached feed was last written, if it exists
    pub fn cache_last_update(&self) -> Option<DateTime<Utc>> {
        self.cache.last_modified(&self.config.cache_key)
    }

    /// Returns true if the cached feed can be served without a fetch
    pub fn is_cache_fresh(&self) -> bool {
        self.is_cache_fresh_at(Utc::now())
    }

    /// Freshness as seen at `now`; a missing cache is never fresh
    pub fn is_cache_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let max_life = self.config.max_cache_life;
        self.cache_last_update()
            .is_some_and(|modified| is_within_lifetime(modified, now, max_life))
    }

    /// Fetches the raw feed once from the remote source
    ///
    /// Under `FetchErrorPolicy::Degrade` a failed request yields an empty
    /// payload instead of an error, and an empty body is passed through.
    pub async fn fetch_remote(&self) -> Result<Vec<u8>, FeedError> {
        match self.source.fetch_raw().await {
            Ok(body) if body.is_empty() => match self.config.fetch_errors {
                FetchErrorPolicy::Fail => Err(FeedError::EmptyResponse),
                FetchErrorPolicy::Degrade => {
                    warn!("feed API returned an empty response");
                    Ok(body)
                }
            },
            Ok(body) => Ok(body),
            Err(e) => match self.config.fetch_errors {
                FetchErrorPolicy::Fail => Err(FeedError::Transport(e)),
                FetchErrorPolicy::Degrade => {
                    warn!(error = %e, "feed request failed");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Fetches and caches the feed if the cache is missing or too old
    ///
    /// # Returns
    /// * `Ok(true)` if the cache was replaced
    /// * `Ok(false)` if the cache was fresh or the payload was rejected
    /// * `Err(FeedError)` if the cache could not be written, or the fetch
    ///   failed under `FetchErrorPolicy::Fail`
    pub async fn refresh_if_stale(&self) -> Result<bool, FeedError> {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited
        if self.is_cache_fresh() {
            debug!(key = %self.config.cache_key, "cache is fresh");
            return Ok(false);
        }

        info!(user_id = %self.config.user_id, "cache is stale, fetching feed");
        let payload = self.fetch_remote().await?;

        if let Some(validate) = self.validator {
            if !validate(&payload) {
                warn!(
                    bytes = payload.len(),
                    "fetched payload failed validation, keeping existing cache"
                );
                return Ok(false);
            }
        }

        self.cache.write(&self.config.cache_key, &payload)?;
        debug!(bytes = payload.len(), "feed cache replaced");
        Ok(true)
    }

    /// Filters the cached feed without refreshing it
    pub fn cached_content(&self, threshold: i64) -> Result<FilterResult, FeedError> {
        let result = match self.cache.read_raw(&self.config.cache_key)? {
            Some(payload) => filter_payload(&payload, threshold),
            None => FilterResult::NoData,
        };
        Ok(result)
    }

    /// Returns the cached records created after `threshold`, refreshing first if stale
    pub async fn get_content(&self, threshold: i64) -> Result<FilterResult, FeedError> {
        self.refresh_if_stale().await?;
        self.cached_content(threshold)
    }
}

/// True if `modified` is at most `max_life` old at `now`
///
/// Both instants are floored to whole seconds before they are compared.
pub fn is_within_lifetime(
    modified: DateTime<Utc>,
    now: DateTime<Utc>,
    max_life: Duration,
) -> bool {
    let elapsed = now.timestamp().saturating_sub(modified.timestamp());
    let max_secs = i64::try_from(max_life.as_secs()).unwrap_or(i64::MAX);
    elapsed <= max_secs
}
