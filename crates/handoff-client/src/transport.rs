//! HTTP transport to the pending-session endpoints

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use handoff_shared::constants::{
    DEFAULT_REQUEST_TIMEOUT_MS, ROUTE_PENDING_CONSUME, ROUTE_PENDING_LOOKUP,
};
use handoff_shared::types::{ConsumeRequest, ConsumeResponse, LookupRequest, LookupResponse};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Server returned status {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response body: {0}")]
    Decode(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HandoffTransport: Send + Sync {
    async fn lookup(&self, device_id: &str) -> Result<LookupResponse, TransportError>;
    async fn consume(&self, session_handle: &str) -> Result<ConsumeResponse, TransportError>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpHandoffTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpHandoffTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Transport with the standard per-request timeout.
    pub fn with_default_timeout(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(base_url, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl HandoffTransport for HttpHandoffTransport {
    async fn lookup(&self, device_id: &str) -> Result<LookupResponse, TransportError> {
        let request = LookupRequest {
            device_id: device_id.to_string(),
        };
        self.post_json(ROUTE_PENDING_LOOKUP, &request).await
    }

    async fn consume(&self, session_handle: &str) -> Result<ConsumeResponse, TransportError> {
        let request = ConsumeRequest {
            session_handle: session_handle.to_string(),
        };
        self.post_json(ROUTE_PENDING_CONSUME, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use handoff_shared::types::ConsumeStatus;

    #[tokio::test]
    async fn test_lookup_sends_camel_case_body_and_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROUTE_PENDING_LOOKUP))
            .and(body_json(json!({ "deviceId": "device-12345" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "found": true,
                "sessionHandle": "abc123",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport =
            HttpHandoffTransport::new(server.uri(), Duration::from_secs(5)).unwrap();
        let response = transport.lookup("device-12345").await.unwrap();

        assert!(response.found);
        assert_eq!(response.session_handle.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_consume_decodes_protocol_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROUTE_PENDING_CONSUME))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "already_consumed" })),
            )
            .mount(&server)
            .await;

        let transport =
            HttpHandoffTransport::new(server.uri(), Duration::from_secs(5)).unwrap();
        let response = transport.consume("abc123").await.unwrap();

        assert_eq!(response.status, ConsumeStatus::AlreadyConsumed);
        assert!(response.app_session.is_none());
    }

    #[tokio::test]
    async fn test_server_fault_surfaces_as_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROUTE_PENDING_LOOKUP))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport =
            HttpHandoffTransport::new(server.uri(), Duration::from_secs(5)).unwrap();
        let result = transport.lookup("device-12345").await;

        assert!(matches!(result, Err(TransportError::Status(500))));
    }
}
