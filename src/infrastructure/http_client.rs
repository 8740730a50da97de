//! HTTP client for the upstream catalog API
//!
//! Wraps reqwest with a per-process rate limiter so the poller and
//! on-demand commands share one outgoing request budget.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{clock::DefaultClock, state::{direct::NotKeyed, InMemoryState}, Quota, RateLimiter};
use reqwest::{header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT}, Client, Response, StatusCode};

use crate::infrastructure::config::{defaults, CatalogApiConfig};

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl From<&CatalogApiConfig> for HttpClientConfig {
    fn from(config: &CatalogApiConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.timeout_seconds,
            max_requests_per_second: config.max_requests_per_second,
        }
    }
}

/// Rate limited HTTP client
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .context("Invalid user agent")?
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // The timeout bounds the whole exchange, body included
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Fetch a URL with rate limiting. Anything but `200 OK` is an error.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Fetching URL: {}", url);

        let response = self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;

        if response.status() != StatusCode::OK {
            anyhow::bail!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            );
        }

        tracing::debug!("Successfully fetched: {} ({})", url, response.status());
        Ok(response)
    }

    /// Fetch URL and return text content
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let text = response.text().await
            .with_context(|| format!("Failed to read response body from: {url}"))?;

        Ok(text)
    }

    /// POST a JSON body with rate limiting. Any 2xx status is accepted.
    pub async fn post_json<B: serde::Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        self.rate_limiter.until_ready().await;

        let response = self.client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to post to: {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/v2/shop")
    }

    #[tokio::test]
    async fn test_get_accepts_200() {
        let url = serve_once("200 OK", r#"{"status":200}"#).await;
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        assert_eq!(client.get_text(&url).await.unwrap(), r#"{"status":200}"#);
    }

    #[tokio::test]
    async fn test_get_rejects_other_success_statuses() {
        let url = serve_once("203 Non-Authoritative Information", r#"{"status":203}"#).await;
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let err = client.get_text(&url).await.unwrap_err();
        assert!(err.to_string().contains("203"));
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let config = HttpClientConfig {
            max_requests_per_second: 0,
            ..Default::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[test]
    fn test_config_from_catalog_section() {
        let catalog = CatalogApiConfig {
            timeout_seconds: 3,
            ..CatalogApiConfig::default()
        };
        let config = HttpClientConfig::from(&catalog);
        assert_eq!(config.timeout_seconds, 3);
        assert_eq!(config.user_agent, catalog.user_agent);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let client = HttpClient::new(HttpClientConfig {
            timeout_seconds: 1,
            ..Default::default()
        }).unwrap();
        assert!(client.get_text("http://127.0.0.1:9/shop").await.is_err());
    }
}
