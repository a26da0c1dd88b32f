//! instafeed - Print recent Instagram media newer than a timestamp
//!
//! Serves the feed from a single-slot disk cache, fetching it from the API only
//! when the cached copy is older than the configured lifetime.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use instafeed::cli::Cli;
use instafeed::{FeedConfig, FeedService, FilterResult};

/// Sends log output to stderr so stdout carries only the feed
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("instafeed=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match FeedConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match FeedService::new(config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match service.get_content(cli.since).await {
        Ok(FilterResult::Records(records)) => match serde_json::to_string(&records) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        // Nothing newer, or nothing usable cached: print nothing
        Ok(FilterResult::NoResults | FilterResult::NoData) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
