//! Instagram API client
//!
//! Fetches the raw recent-media response for one user. The body is returned
//! as-is: it is not parsed, and non-success HTTP statuses are not treated as
//! errors, so the caller decides what is worth caching.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tracing::debug;

use crate::config::FeedConfig;

/// Source of raw feed payloads
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Performs a single fetch of the feed, without retries
    async fn fetch_raw(&self) -> Result<Vec<u8>, reqwest::Error>;
}

/// Client for the Instagram recent-media endpoint
#[derive(Debug, Clone)]
pub struct InstagramClient {
    http_client: Client,
    base_url: String,
    user_id: String,
    api_token: String,
}

impl InstagramClient {
    /// Creates a client from the service configuration
    ///
    /// The HTTP client requests JSON and gives up connecting after
    /// `config.connect_timeout`.
    pub fn from_config(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self::with_client(http_client, config))
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, config: &FeedConfig) -> Self {
        Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            api_token: config.api_token.clone(),
        }
    }

    /// Returns the recent-media URL for the configured user, without credentials
    pub fn endpoint(&self) -> String {
        format!("{}/users/{}/media/recent/", self.base_url, self.user_id)
    }
}

#[async_trait]
impl FeedSource for InstagramClient {
    async fn fetch_raw(&self) -> Result<Vec<u8>, reqwest::Error> {
        let url = self.endpoint();
        debug!(%url, "requesting recent media");

        let response = self
            .http_client
            .get(&url)
            .query(&[("access_token", self.api_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "received feed response");

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_config(base_url: &str) -> FeedConfig {
        FeedConfig::new("42", "secret").with_api_base_url(base_url)
    }

    #[test]
    fn test_endpoint_includes_user_id() {
        let config = test_config("https://api.example.com/v1/");
        let client = InstagramClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/v1/users/42/media/recent/"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_token_and_accept_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/42/media/recent/")
            .match_query(Matcher::UrlEncoded("access_token".into(), "secret".into()))
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let client = InstagramClient::from_config(&test_config(&server.url())).unwrap();
        let body = client.fetch_raw().await.unwrap();

        assert_eq!(body, br#"{"data":[]}"#.to_vec());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_returns_error_body_as_is() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/42/media/recent/")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"meta":{"code":400}}"#)
            .create_async()
            .await;

        let client = InstagramClient::from_config(&test_config(&server.url())).unwrap();
        let body = client.fetch_raw().await.unwrap();

        assert_eq!(body, br#"{"meta":{"code":400}}"#.to_vec());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_error() {
        let client = InstagramClient::from_config(&test_config("http://127.0.0.1:1")).unwrap();
        assert!(client.fetch_raw().await.is_err());
    }
}
