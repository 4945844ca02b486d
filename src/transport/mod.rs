//! Transport to the storytelling service.
//!
//! One capability, "produce the assistant's reply for a message", with two
//! implementations:
//! - `OneShot`: asks for a single JSON document per request
//! - `Streamed`: asks for chunked text, with `[typing]` heartbeats filtered out
//!
//! Which way a reply is read is negotiated per response from its
//! `Content-Type` (see [`negotiate`]); the configured kind is only the
//! preference and the fallback for untyped responses. The chat view only
//! ever sees [`ReplyEvent`]s, so it does not care which one is active.

mod error;
mod exchange;
mod oneshot;
mod reader;
mod response;
mod streamed;

pub use error::{TransportError, TransportResult};
pub use exchange::negotiate;
pub use oneshot::OneShotTransport;
pub use reader::{read_stream, Utf8Decoder, TYPING_MARKER};
pub use response::{ChatRequest, ChatResponse, Reply, FALLBACK_REPLY, NO_RESPONSE};
pub use streamed::StreamedTransport;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::ServiceConfig;

/// How the service is asked to deliver replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// One JSON document per request.
    #[default]
    OneShot,
    /// Chunked text stream.
    Streamed,
}

impl TransportKind {
    pub const fn display_name(&self) -> &'static str {
        match self {
            TransportKind::OneShot => "one-shot",
            TransportKind::Streamed => "streamed",
        }
    }

    /// Parse a kind as written in config or the environment.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "oneshot" | "one-shot" | "json" => Some(TransportKind::OneShot),
            "streamed" | "stream" | "streaming" => Some(TransportKind::Streamed),
            _ => None,
        }
    }
}

/// Events produced while a request is in flight.
///
/// Every request ends with exactly one of `Reply`, `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    /// A piece of streamed text.
    Chunk(String),
    /// A complete, classified one-shot reply.
    Reply(Reply),
    /// The stream finished.
    Done,
    /// The request failed.
    Error(TransportError),
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub kind: TransportKind,
    pub endpoint: Url,
    pub session: String,
}

impl ClientConfig {
    /// Resolve the service section of the config file, with environment
    /// variables taking precedence.
    ///
    /// - `STORY_CHAT_ENDPOINT` overrides `service.endpoint`
    /// - `STORY_CHAT_SESSION` overrides `service.session`
    /// - `STORY_CHAT_TRANSPORT` overrides `service.transport`
    ///
    /// A session that is not configured anywhere is generated.
    pub fn from_env_and_config(file_config: &ServiceConfig) -> anyhow::Result<Self> {
        let mut endpoint = file_config.endpoint.clone();
        let mut session = file_config.session.clone();
        let mut kind = file_config.transport;

        if let Ok(value) = std::env::var("STORY_CHAT_ENDPOINT") {
            endpoint = value;
        }
        if let Ok(value) = std::env::var("STORY_CHAT_SESSION") {
            session = Some(value);
        }
        if let Ok(value) = std::env::var("STORY_CHAT_TRANSPORT") {
            kind = TransportKind::parse(&value)
                .ok_or_else(|| anyhow!("unknown transport {:?} in STORY_CHAT_TRANSPORT", value))?;
        }

        Self::new(kind, &endpoint, session)
    }

    /// Build a config, validating the endpoint and filling in a session.
    pub fn new(kind: TransportKind, endpoint: &str, session: Option<String>) -> anyhow::Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(anyhow!("no service endpoint configured"));
        }
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid service endpoint {:?}", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "service endpoint {:?} must use http or https",
                endpoint.as_str()
            ));
        }

        let session = session
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_session_id);

        Ok(Self {
            kind,
            endpoint,
            session,
        })
    }

    /// URL of the service's health check, on the same origin as the endpoint.
    pub fn health_url(&self) -> Url {
        health_url(&self.endpoint)
    }
}

/// A fresh session identifier.
pub fn generate_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4().simple())
}

fn health_url(endpoint: &Url) -> Url {
    let mut url = endpoint.clone();
    url.set_path("/health");
    url.set_query(None);
    url
}

/// Trait implemented by both transports.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which delivery mode this transport speaks.
    fn kind(&self) -> TransportKind;

    /// The chat endpoint requests go to.
    fn endpoint(&self) -> &Url;

    /// Send `message` for `session`.
    ///
    /// The work runs on a spawned task. The returned receiver yields
    /// [`ReplyEvent`]s and always ends with a terminal event, unless the
    /// task itself dies, in which case the channel simply closes.
    fn request(&self, session: &str, message: &str) -> mpsc::UnboundedReceiver<ReplyEvent>;

    /// Check whether the service is up.
    async fn health(&self) -> TransportResult<()>;
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

/// `GET /health` on the endpoint's origin, expecting `{"ok": true}`.
pub(crate) async fn check_health(client: &Client, endpoint: &Url) -> TransportResult<()> {
    let response = client.get(health_url(endpoint)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    let health: HealthResponse = response.json().await?;
    if health.ok {
        Ok(())
    } else {
        Err(TransportError::Decode("health check did not report ok".to_string()))
    }
}

/// Handle to the active transport.
///
/// Cheap to clone; the chat view holds one and never needs to know which
/// transport is behind it.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn Transport>,
}

impl ChatClient {
    /// Create the transport preferred by the config.
    pub fn new(config: &ClientConfig) -> Self {
        let transport: Arc<dyn Transport> = match config.kind {
            TransportKind::OneShot => Arc::new(OneShotTransport::new(config.endpoint.clone())),
            TransportKind::Streamed => Arc::new(StreamedTransport::new(config.endpoint.clone())),
        };
        Self { inner: transport }
    }

    /// Wrap an existing transport.
    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        Self { inner: transport }
    }

    pub fn kind(&self) -> TransportKind {
        self.inner.kind()
    }

    pub fn endpoint(&self) -> &Url {
        self.inner.endpoint()
    }

    /// Send a message. See [`Transport::request`].
    pub fn request(&self, session: &str, message: &str) -> mpsc::UnboundedReceiver<ReplyEvent> {
        self.inner.request(session, message)
    }

    /// Check whether the service is up.
    pub async fn health(&self) -> TransportResult<()> {
        self.inner.health().await
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("kind", &self.kind())
            .field("endpoint", &self.endpoint().as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_parse() {
        assert_eq!(TransportKind::parse("oneshot"), Some(TransportKind::OneShot));
        assert_eq!(TransportKind::parse(" Streamed "), Some(TransportKind::Streamed));
        assert_eq!(TransportKind::parse("stream"), Some(TransportKind::Streamed));
        assert_eq!(TransportKind::parse("carrier pigeon"), None);
    }

    #[test]
    fn test_client_config_keeps_session() {
        let config = ClientConfig::new(
            TransportKind::OneShot,
            "http://127.0.0.1:5000/chat",
            Some("kid-session-01".to_string()),
        )
        .unwrap();
        assert_eq!(config.session, "kid-session-01");
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:5000/chat");
    }

    #[test]
    fn test_client_config_generates_session() {
        let a = ClientConfig::new(TransportKind::OneShot, "http://localhost/chat", None).unwrap();
        let b = ClientConfig::new(TransportKind::OneShot, "http://localhost/chat", Some("  ".into()))
            .unwrap();
        assert!(a.session.starts_with("session-"));
        assert!(b.session.starts_with("session-"));
        assert_ne!(a.session, b.session);
    }

    #[test]
    fn test_client_config_rejects_bad_endpoint() {
        assert!(ClientConfig::new(TransportKind::OneShot, "", None).is_err());
        assert!(ClientConfig::new(TransportKind::OneShot, "not a url", None).is_err());
    }

    #[test]
    fn test_client_config_rejects_non_http_scheme() {
        // Parses as scheme "localhost", which reqwest cannot send to
        let err = ClientConfig::new(TransportKind::OneShot, "localhost:5000/chat", None).unwrap_err();
        assert!(err.to_string().contains("http or https"));
        assert!(ClientConfig::new(TransportKind::OneShot, "ftp://stories.local/chat", None).is_err());
        assert!(ClientConfig::new(TransportKind::OneShot, "https://stories.local/chat", None).is_ok());
    }

    #[test]
    fn test_health_url_uses_origin() {
        let config = ClientConfig::new(
            TransportKind::Streamed,
            "http://127.0.0.1:5000/api/chat?x=1",
            None,
        )
        .unwrap();
        assert_eq!(config.health_url().as_str(), "http://127.0.0.1:5000/health");
    }

    #[test]
    fn test_chat_client_kind() {
        let config =
            ClientConfig::new(TransportKind::Streamed, "http://localhost:5000/chat", None).unwrap();
        let client = ChatClient::new(&config);
        assert_eq!(client.kind(), TransportKind::Streamed);
        assert_eq!(client.endpoint().as_str(), "http://localhost:5000/chat");
    }
}
