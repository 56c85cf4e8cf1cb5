//! Transport seam used for fetching profile pages and posting webhooks

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::XpSentinelError;

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface the watcher needs, mocked in tests
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Fetch `url` and return whatever the server answered
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;

    /// POST `body` as JSON to `url`
    async fn post_json(&self, url: &str, body: &serde_json::Value)
        -> crate::Result<HttpResponse>;
}

/// reqwest-backed client
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client that sends the configured user agent and enforces the timeout
    pub fn new(config: &HttpConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| XpSentinelError::Http(format!("Building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Send a prepared request and collect status and body
async fn execute(
    method: &str,
    url: &str,
    request: reqwest::RequestBuilder,
) -> crate::Result<HttpResponse> {
    let response = request
        .send()
        .await
        .map_err(|e| XpSentinelError::Http(format!("{} {} failed: {}", method, url, e)))?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| {
        XpSentinelError::Http(format!("{} {}: unreadable body: {}", method, url, e))
    })?;

    tracing::debug!("{} {} answered {} with {} bytes", method, url, status, body.len());
    Ok(HttpResponse { status, body })
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        execute("GET", url, self.client.get(url)).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> crate::Result<HttpResponse> {
        execute("POST", url, self.client.post(url).json(body)).await
    }
}
