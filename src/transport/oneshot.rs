//! One-shot transport: asks for a single JSON document per request.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::mpsc;

use super::exchange::{post_chat, read_document, spawn_request};
use super::{check_health, ChatResponse, ReplyEvent, Transport, TransportKind, TransportResult};

/// Transport for services that answer with a single JSON document.
///
/// A service that streams text instead is still read correctly; see
/// [`negotiate`](super::negotiate).
pub struct OneShotTransport {
    client: Client,
    endpoint: Url,
}

impl OneShotTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    /// Post a message and return the parsed response document.
    ///
    /// A single attempt with no timeout: non-success statuses and bodies that
    /// are not JSON objects are errors.
    pub async fn exchange(&self, session: &str, message: &str) -> TransportResult<ChatResponse> {
        let response =
            post_chat(&self.client, &self.endpoint, TransportKind::OneShot, session, message)
                .await?;
        read_document(response).await
    }

    /// Post a message and return the first non-empty of `story`, `reply` or
    /// `error`, or "No response" when none is set.
    pub async fn send_message(&self, session: &str, message: &str) -> TransportResult<String> {
        let response = self.exchange(session, message).await?;
        Ok(response.best_text().to_string())
    }
}

#[async_trait]
impl Transport for OneShotTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::OneShot
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, session: &str, message: &str) -> mpsc::UnboundedReceiver<ReplyEvent> {
        spawn_request(
            self.client.clone(),
            self.endpoint.clone(),
            TransportKind::OneShot,
            session,
            message,
        )
    }

    async fn health(&self) -> TransportResult<()> {
        check_health(&self.client, &self.endpoint).await
    }
}
