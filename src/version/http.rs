//! Shared HTTP plumbing for upstream sources

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{DEFAULT_USER_AGENT, FETCH_TIMEOUT_MS, HttpConfig};
use crate::version::error::SourceError;

/// Thin wrapper over `reqwest::Client` with a fixed User-Agent and a bounded
/// per-request timeout. Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            &config.user_agent,
            Duration::from_millis(config.timeout_ms),
        )
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<reqwest::Response, SourceError> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SourceError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Upstream returned status {}: {}", status, url);
            return Err(SourceError::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// GET a JSON document. A body that does not deserialize into `T` is a
    /// shape change, not a transport failure.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        self.get_json_with_headers(url, &[]).await
    }

    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let body = self.get(url, headers).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse response from {}: {}", url, e);
            SourceError::ShapeChanged(format!("{url}: {e}"))
        })
    }

    /// GET a document as text (XML feeds, HTML pages)
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        Ok(self.get(url, &[]).await?.text().await?)
    }

    /// HEAD request; `Ok(true)` for a success status
    pub async fn head_ok(&self, url: &str) -> Result<bool, reqwest::Error> {
        let response = self.client.head(url).send().await?;
        Ok(response.status().is_success())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, Duration::from_millis(FETCH_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Project {
        versions: Vec<String>,
    }

    #[tokio::test]
    async fn get_json_returns_status_error_for_server_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/project")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpClient::default();
        let result: Result<Project, _> = client
            .get_json(&format!("{}/project", server.url()))
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SourceError::Status { status, .. }) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn get_json_returns_shape_changed_for_missing_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/project")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"project_id": "paper"}"#)
            .create_async()
            .await;

        let client = HttpClient::default();
        let result: Result<Project, _> = client
            .get_json(&format!("{}/project", server.url()))
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::ShapeChanged(_))));
    }

    #[tokio::test]
    async fn get_json_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/project")
            .with_status(429)
            .with_header("retry-after", "60")
            .create_async()
            .await;

        let client = HttpClient::default();
        let result: Result<Project, _> = client
            .get_json(&format!("{}/project", server.url()))
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SourceError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn head_ok_reports_success_and_failure() {
        let mut server = Server::new_async().await;
        let found = server
            .mock("HEAD", "/found.jar")
            .with_status(200)
            .create_async()
            .await;
        let missing = server
            .mock("HEAD", "/missing.jar")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::default();

        assert!(client.head_ok(&format!("{}/found.jar", server.url())).await.unwrap());
        assert!(!client.head_ok(&format!("{}/missing.jar", server.url())).await.unwrap());
        found.assert_async().await;
        missing.assert_async().await;
    }
}
