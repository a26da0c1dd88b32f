//! Runtime configuration for the feed service

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Default freshness window in seconds
pub const DEFAULT_MAX_CACHE_LIFE_SECS: u64 = 30;

/// Default connect timeout for the remote API in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Key of the single cached feed blob
pub const DEFAULT_CACHE_KEY: &str = "instagram-feed";

/// Base URL for the Instagram API
pub const DEFAULT_API_BASE_URL: &str = "https://api.instagram.com/v1";

/// How fetch failures and empty responses are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorPolicy {
    /// Cache whatever came back and let it read as "no results"
    #[default]
    Degrade,
    /// Return the failure to the caller and leave the cache untouched
    Fail,
}

/// Configuration for a `FeedService`
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Remote account identifier
    pub user_id: String,
    /// Access token sent with every API call
    pub api_token: String,
    /// Maximum age of the cached feed before it is fetched again
    pub max_cache_life: Duration,
    /// Directory holding the cache file
    pub cache_dir: PathBuf,
    /// File name of the cached feed inside `cache_dir`
    pub cache_key: String,
    /// Base URL of the remote API
    pub api_base_url: String,
    /// Connect timeout for the remote API
    pub connect_timeout: Duration,
    /// Refuse to cache payloads that do not parse as a feed
    pub validate_payload: bool,
    pub fetch_errors: FetchErrorPolicy,
}

impl FeedConfig {
    /// Creates a configuration for the given account with default settings
    pub fn new(user_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_token: api_token.into(),
            max_cache_life: Duration::from_secs(DEFAULT_MAX_CACHE_LIFE_SECS),
            cache_dir: default_cache_dir(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            validate_payload: false,
            fetch_errors: FetchErrorPolicy::default(),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_max_cache_life(mut self, max_cache_life: Duration) -> Self {
        self.max_cache_life = max_cache_life;
        self
    }
}

/// Returns the XDG-compliant cache directory, or the temp dir if none is known
///
/// Uses `~/.cache/instafeed/` on Linux, or the equivalent on other platforms.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "instafeed")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("instafeed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = FeedConfig::new("12345", "token");

        assert_eq!(config.user_id, "12345");
        assert_eq!(config.api_token, "token");
        assert_eq!(config.max_cache_life, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_key, "instagram-feed");
        assert_eq!(config.api_base_url, "https://api.instagram.com/v1");
        assert!(!config.validate_payload);
        assert_eq!(config.fetch_errors, FetchErrorPolicy::Degrade);
    }

    #[test]
    fn test_default_cache_dir_mentions_project() {
        let dir = default_cache_dir();
        assert!(dir.to_string_lossy().contains("instafeed"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = FeedConfig::new("1", "t")
            .with_cache_dir("/tmp/feed-cache")
            .with_api_base_url("http://localhost:1234")
            .with_max_cache_life(Duration::from_secs(600));

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/feed-cache"));
        assert_eq!(config.api_base_url, "http://localhost:1234");
        assert_eq!(config.max_cache_life, Duration::from_secs(600));
    }
}
