//! Delivery of prepared messages to push services.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};

use super::encryption::EncryptionError;
use super::message::WebPushMessage;
use super::vapid::VapidError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure delivering to one subscription.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Invalid subscription keys: {0}")]
    InvalidSubscription(String),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Vapid(#[from] VapidError),

    /// Network, DNS or TLS failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push service answered with a non-2xx status.
    #[error("Push service returned HTTP {0}")]
    HttpStatus(u16),
}

impl PushError {
    /// The push service reports the subscription no longer exists.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::HttpStatus(404 | 410))
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, message: &WebPushMessage) -> Result<(), PushError>;
}

/// Sends messages with `reqwest`. No request timeout is set: the message's
/// own TTL is the only expiry.
pub struct HttpPushTransport {
    client: reqwest::Client,
}

impl HttpPushTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("barbershop-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }
}

impl Default for HttpPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn send(&self, message: &WebPushMessage) -> Result<(), PushError> {
        let response = self
            .client
            .post(&message.endpoint)
            .header("TTL", message.ttl.to_string())
            .header("Urgency", message.urgency.as_str())
            .header(CONTENT_ENCODING, "aes128gcm")
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(AUTHORIZATION, &message.authorization)
            .body(message.body.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use uuid::Uuid;

    use super::*;
    use crate::testing::{subscription, test_signer};
    use crate::web_push::encryption::HEADER_LEN;
    use crate::web_push::Urgency;

    const PAYLOAD: &[u8] = r#"{"title":"Hola","body":"Tu cita es mañana"}"#.as_bytes();

    /// Headers and body of every request the fake push service received.
    #[derive(Clone, Default)]
    struct Received(Arc<Mutex<Vec<(HeaderMap, Bytes)>>>);

    /// Answers `POST /push/{status}` with `status`.
    async fn push_service(
        State(received): State<Received>,
        Path(status): Path<u16>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        received.0.lock().unwrap().push((headers, body));
        StatusCode::from_u16(status).unwrap()
    }

    async fn spawn_push_service() -> (SocketAddr, Received) {
        let received = Received::default();
        let app = Router::new()
            .route("/push/{status}", post(push_service))
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (addr, received)
    }

    fn message(endpoint: &str) -> WebPushMessage {
        let sub = subscription(1, Uuid::new_v4(), endpoint);
        WebPushMessage::build(&sub, PAYLOAD, &test_signer(), 86_400, Urgency::Normal).unwrap()
    }

    // -- Over HTTP -----------------------------------------------------------

    #[tokio::test]
    async fn sends_web_push_headers_and_encrypted_body() {
        let (addr, received) = spawn_push_service().await;
        let msg = message(&format!("http://{addr}/push/201"));

        HttpPushTransport::new().send(&msg).await.unwrap();

        let requests = received.0.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers["ttl"], "86400");
        assert_eq!(headers["urgency"], "normal");
        assert_eq!(headers["content-encoding"], "aes128gcm");
        assert_eq!(headers["content-type"], "application/octet-stream");
        let authorization = headers["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("vapid t="), "{authorization}");
        assert!(authorization.contains(", k="), "{authorization}");
        // Header, plaintext, delimiter byte and 16-byte tag.
        assert_eq!(body.len(), HEADER_LEN + PAYLOAD.len() + 1 + 16);
        assert_eq!(body.as_ref(), msg.body.as_slice());
    }

    #[tokio::test]
    async fn gone_endpoint_is_expired() {
        let (addr, _received) = spawn_push_service().await;
        let msg = message(&format!("http://{addr}/push/410"));

        let err = HttpPushTransport::new().send(&msg).await.unwrap_err();

        assert_matches!(err, PushError::HttpStatus(410));
        assert!(err.is_expired());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let (addr, _received) = spawn_push_service().await;
        let msg = message(&format!("http://{addr}/push/500"));

        let err = HttpPushTransport::new().send(&msg).await.unwrap_err();

        assert_matches!(err, PushError::HttpStatus(500));
        assert!(!err.is_expired());
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let msg = message(&format!("http://{addr}/push/201"));

        let err = HttpPushTransport::new().send(&msg).await.unwrap_err();

        assert_matches!(err, PushError::Request(_));
        assert!(!err.is_expired());
    }

    // -- Classification ------------------------------------------------------

    #[test]
    fn only_404_and_410_are_expired() {
        assert!(PushError::HttpStatus(404).is_expired());
        assert!(PushError::HttpStatus(410).is_expired());
        for status in [400, 401, 403, 413, 429, 500, 503] {
            assert!(!PushError::HttpStatus(status).is_expired(), "{status}");
        }
        assert!(!PushError::InvalidSubscription("x".into()).is_expired());
    }

    #[test]
    fn http_status_display() {
        assert_eq!(
            PushError::HttpStatus(410).to_string(),
            "Push service returned HTTP 410"
        );
    }

    #[test]
    fn default_does_not_panic() {
        let _transport = HttpPushTransport::default();
    }
}
