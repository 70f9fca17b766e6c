//! HTTP client for the dashboard backend
//!
//! One uniform contract for every view: attach the bearer token, serialize
//! the body, and normalize all failure into a user-visible notice plus a
//! `None` result. Callers must treat `None` as "unknown", never as "empty".

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::notify::Notices;

/// Authenticated HTTP client shared by every view in a session.
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    notices: Notices,
}

impl ApiClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: &ApiConfig, notices: Notices) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            token: RwLock::new(None),
            notices,
        })
    }

    /// Install (or clear) the bearer token once the identity provider has
    /// issued one. Until a token is set, every fetch resolves to `None`
    /// without touching the network.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    /// Perform an authenticated request against the backend.
    ///
    /// - No token yet → `None` immediately, zero network calls, no notice
    ///   (not ready is not an error).
    /// - Transport or HTTP failure → one notice carrying the status text,
    ///   a diagnostic log line, and `None`. No automatic retry; refresh
    ///   comes from the cache layer's revalidation.
    /// - Success → the parsed JSON body, whatever shape the endpoint
    ///   defines.
    pub async fn fetch(&self, method: Method, path: &str, body: Option<&Value>) -> Option<Value> {
        let token = self.token()?;

        match self.request(&token, method, path, body).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "API request failed");
                self.notices.error(e.to_string());
                None
            }
        }
    }

    /// GET without a body.
    pub async fn get(&self, path: &str) -> Option<Value> {
        self.fetch(Method::GET, path, None).await
    }

    /// POST with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Option<Value> {
        self.fetch(Method::POST, path, Some(body)).await
    }

    async fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http_client.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Http(format!("failed to parse response: {}", e)))
        } else {
            let reason = status.canonical_reason().unwrap_or("request failed");
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.is_empty() {
                reason.to_string()
            } else {
                format!("{}: {}", reason, detail)
            };
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify;

    fn test_config() -> ApiConfig {
        ApiConfig {
            base_url: "https://api.tracelens.dev".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_requires_valid_config() {
        let config = ApiConfig::default();
        assert!(ApiClient::new(&config, Notices::disconnected()).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig {
            base_url: "https://api.tracelens.dev/".to_string(),
            timeout_secs: 5,
        };
        let client = ApiClient::new(&config, Notices::disconnected()).unwrap();
        assert_eq!(client.base_url, "https://api.tracelens.dev");
    }

    #[tokio::test]
    async fn test_missing_token_skips_network_silently() {
        let (notices, mut rx) = notify::channel();
        let client = ApiClient::new(&test_config(), notices).unwrap();

        let result = client.get("/api/projects/proj-1").await;

        assert!(result.is_none());
        // Auth-missing is "not ready", not an error: no notice either.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_token_install_and_clear() {
        let client = ApiClient::new(&test_config(), Notices::disconnected()).unwrap();
        assert!(client.token().is_none());

        client.set_token(Some("tok-1".to_string()));
        assert_eq!(client.token().as_deref(), Some("tok-1"));

        client.set_token(None);
        assert!(client.token().is_none());
    }
}
