//! Command-line interface parsing for instafeed
//!
//! This module handles parsing of CLI arguments using clap. Every setting except
//! `--since` can also come from an `INSTAFEED_*` environment variable so the
//! token does not have to appear on the command line.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::{
    default_cache_dir, FeedConfig, FetchErrorPolicy, DEFAULT_API_BASE_URL, DEFAULT_CACHE_KEY,
    DEFAULT_MAX_CACHE_LIFE_SECS,
};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A required setting was given but left blank
    #[error("Missing value for {0}")]
    EmptyValue(&'static str),
}

/// instafeed - Print a user's recent Instagram media newer than a timestamp
#[derive(Parser, Debug)]
#[command(name = "instafeed")]
#[command(about = "Recent Instagram media served through a single-slot disk cache")]
#[command(version)]
pub struct Cli {
    /// Only print records created after this Unix timestamp
    #[arg(long, value_name = "UNIX_TS", allow_negative_numbers = true)]
    pub since: i64,

    /// Instagram account identifier
    #[arg(long, env = "INSTAFEED_USER_ID")]
    pub user_id: String,

    /// Instagram API access token
    #[arg(long, env = "INSTAFEED_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Seconds a cached feed is served before it is fetched again
    #[arg(
        long,
        value_name = "SECONDS",
        env = "INSTAFEED_MAX_CACHE_LIFE",
        default_value_t = DEFAULT_MAX_CACHE_LIFE_SECS
    )]
    pub max_cache_life: u64,

    /// Directory holding the cache file [default: platform cache dir]
    #[arg(long, env = "INSTAFEED_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// File name of the cached feed, relative to the cache directory
    #[arg(long, env = "INSTAFEED_CACHE_KEY", default_value = DEFAULT_CACHE_KEY)]
    pub cache_key: String,

    /// Base URL of the Instagram API
    #[arg(long, env = "INSTAFEED_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Do not overwrite the cache with a response that has no `data` array
    #[arg(long, env = "INSTAFEED_VALIDATE_PAYLOAD")]
    pub validate_payload: bool,

    /// Exit with an error when the API is unreachable or answers empty
    #[arg(long, env = "INSTAFEED_FAIL_ON_FETCH_ERROR")]
    pub fail_on_fetch_error: bool,
}

impl FeedConfig {
    /// Creates a FeedConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(FeedConfig)` with the requested settings
    /// * `Err(CliError)` if the user id, token or cache key is blank
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.user_id.trim().is_empty() {
            return Err(CliError::EmptyValue("--user-id"));
        }
        if cli.api_token.trim().is_empty() {
            return Err(CliError::EmptyValue("--api-token"));
        }
        if cli.cache_key.trim().is_empty() {
            return Err(CliError::EmptyValue("--cache-key"));
        }

        let mut config = FeedConfig::new(cli.user_id.trim(), cli.api_token.trim())
            .with_cache_dir(cli.cache_dir.clone().unwrap_or_else(default_cache_dir))
            .with_api_base_url(cli.api_base_url.clone())
            .with_max_cache_life(Duration::from_secs(cli.max_cache_life));
        config.cache_key = cli.cache_key.clone();
        config.validate_payload = cli.validate_payload;
        config.fetch_errors = if cli.fail_on_fetch_error {
            FetchErrorPolicy::Fail
        } else {
            FetchErrorPolicy::Degrade
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_ARGS: [&str; 7] = [
        "instafeed",
        "--since",
        "1700000000",
        "--user-id",
        "42",
        "--api-token",
        "secret",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::parse_from(BASE_ARGS.iter().chain(extra.iter()))
    }

    #[test]
    fn test_cli_parse_required_args() {
        let cli = parse(&[]);
        assert_eq!(cli.since, 1_700_000_000);
        assert_eq!(cli.user_id, "42");
        assert_eq!(cli.api_token, "secret");
        assert_eq!(cli.max_cache_life, 30);
        assert_eq!(cli.cache_key, "instagram-feed");
        assert!(cli.cache_dir.is_none());
        assert!(!cli.validate_payload);
        assert!(!cli.fail_on_fetch_error);
    }

    #[test]
    fn test_cli_rejects_non_numeric_since() {
        let result = Cli::try_parse_from([
            "instafeed",
            "--since",
            "yesterday",
            "--user-id",
            "42",
            "--api-token",
            "t",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_accepts_negative_since() {
        let cli = Cli::parse_from([
            "instafeed",
            "--since",
            "-1",
            "--user-id",
            "42",
            "--api-token",
            "t",
        ]);
        assert_eq!(cli.since, -1);
    }

    #[test]
    fn test_feed_config_from_cli_defaults() {
        let config = FeedConfig::from_cli(&parse(&[])).unwrap();
        assert_eq!(config.user_id, "42");
        assert_eq!(config.api_token, "secret");
        assert_eq!(config.max_cache_life, Duration::from_secs(30));
        assert_eq!(config.cache_dir, default_cache_dir());
        assert_eq!(config.fetch_errors, FetchErrorPolicy::Degrade);
        assert!(!config.validate_payload);
    }

    #[test]
    fn test_feed_config_from_cli_overrides() {
        let cli = parse(&[
            "--max-cache-life",
            "600",
            "--cache-dir",
            "/var/cache/feed",
            "--cache-key",
            "feed.json",
            "--validate-payload",
            "--fail-on-fetch-error",
        ]);
        let config = FeedConfig::from_cli(&cli).unwrap();
        assert_eq!(config.max_cache_life, Duration::from_secs(600));
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/feed"));
        assert_eq!(config.cache_key, "feed.json");
        assert!(config.validate_payload);
        assert_eq!(config.fetch_errors, FetchErrorPolicy::Fail);
    }

    #[test]
    fn test_feed_config_from_cli_blank_token() {
        let cli = Cli::parse_from([
            "instafeed",
            "--since",
            "0",
            "--user-id",
            "42",
            "--api-token",
            " ",
        ]);
        let err = FeedConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("--api-token"));
    }
}
