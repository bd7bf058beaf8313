//! REST transport over the biobank backend's JSON API.
//!
//! [`BiobankApi`] is the production implementation of [`RestTransport`],
//! built on [`reqwest`]. The trait exists so the host entities can be
//! exercised against an in-memory transport in tests.

use async_trait::async_trait;

/// Errors from the REST transport layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Minimal HTTP capability the host entities depend on.
///
/// Methods resolve with the reply's JSON payload or reject with an
/// [`ApiError`]; no retry policy lives at this level.
#[async_trait]
pub trait RestTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError>;
    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError>;
    async fn delete(&self, path: &str) -> Result<serde_json::Value, ApiError>;
}

/// reqwest-backed client for the biobank backend.
pub struct BiobankApi {
    client: reqwest::Client,
    base_url: String,
}

impl BiobankApi {
    /// Create a client for the given API base URL, e.g.
    /// `https://host/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body, unwrapping the backend's
    /// `{ "status": …, "data": … }` reply envelope when present.
    async fn parse_response(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let response = Self::ensure_success(response).await?;
        let value = response.json::<serde_json::Value>().await?;
        Ok(unwrap_data(value))
    }
}

/// Replies are wrapped in a `data` envelope; callers want the payload.
fn unwrap_data(mut value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut value {
        if let Some(data) = map.remove("data") {
            return data;
        }
    }
    value
}

#[async_trait]
impl RestTransport for BiobankApi {
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        Self::parse_response(response).await
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(path, "DELETE");
        let response = self.client.delete(self.url(path)).send().await?;
        Self::parse_response(response).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_joins_without_duplicate_slashes() {
        let api = BiobankApi::new("https://host/api/");
        assert_eq!(api.url("/studies/s1"), "https://host/api/studies/s1");
        assert_eq!(api.url("studies/s1"), "https://host/api/studies/s1");
    }

    #[test]
    fn unwrap_data_extracts_envelope_payload() {
        let value = json!({"status": "success", "data": {"id": "p1"}});
        assert_eq!(unwrap_data(value), json!({"id": "p1"}));
    }

    #[test]
    fn unwrap_data_passes_bare_payload_through() {
        let value = json!({"id": "p1"});
        assert_eq!(unwrap_data(value), json!({"id": "p1"}));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
    }
}
