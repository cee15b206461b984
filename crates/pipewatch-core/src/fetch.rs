//! Fetch adapter: one HTTP call in, one tagged value out.
//!
//! The [`Fetcher`] trait is the seam between the engine and the network so
//! the poller and orchestrator can be driven by scripted fetchers in tests.
//! [`HttpFetcher`] is the production implementation. It adds no retries and
//! no timeouts beyond the transport defaults.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Source of JSON documents addressed by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and decode the body as JSON
    async fn get_json(&self, url: &str) -> FetchResult<Value>;

    /// POST an empty body to `url` and decode the response as JSON
    async fn post_json(&self, url: &str) -> FetchResult<Value>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (custom TLS roots, proxies, ...)
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn settle(url: &str, sent: reqwest::Result<reqwest::Response>) -> FetchResult<Value> {
        let response = sent.map_err(|e| {
            warn!(url, error = %e, "Request failed");
            FetchError::transport(e)
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!(url, status = status.as_u16(), error = %e, "Failed to read response body");
            FetchError::transport(e)
        })?;

        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!(url, error = %e, "Malformed JSON body");
            FetchError::Transport {
                message: format!("invalid JSON in response body: {e}"),
            }
        })
    }
}

/// Extract the `message` field services put in error bodies
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> FetchResult<Value> {
        Self::settle(url, self.client.get(url).send().await).await
    }

    async fn post_json(&self, url: &str) -> FetchResult<Value> {
        Self::settle(url, self.client.post(url).send().await).await
    }
}

/// Decode a fetched document into a typed value, folding decode failures
/// into the transport class.
pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> FetchResult<T> {
    serde_json::from_value(value).map_err(|e| FetchError::Transport {
        message: format!("unexpected response shape: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TriggerResponse;
    use serde_json::json;

    #[test]
    fn server_message_reads_message_field() {
        let body = br#"{"message": "No consistency checks have been run yet"}"#;
        assert_eq!(
            server_message(body).as_deref(),
            Some("No consistency checks have been run yet")
        );
    }

    #[test]
    fn server_message_ignores_other_bodies() {
        assert!(server_message(b"<html>bad gateway</html>").is_none());
        assert!(server_message(br#"{"detail": "nope"}"#).is_none());
        assert!(server_message(br#"{"message": 42}"#).is_none());
    }

    #[test]
    fn decode_typed_payload() {
        let parsed: TriggerResponse = decode(json!({"processing_time_ms": 120})).unwrap();
        assert_eq!(parsed.processing_time_ms, 120);
    }

    #[test]
    fn decode_shape_mismatch_is_transport_error() {
        let err = decode::<TriggerResponse>(json!({"elapsed": "fast"})).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().starts_with("unexpected response shape"));
    }
}
