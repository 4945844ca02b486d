//! Streamed transport: asks for chunked text per request.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::mpsc;

use super::exchange::spawn_request;
use super::{check_health, ReplyEvent, Transport, TransportKind, TransportResult};

/// Transport for services that stream the reply as UTF-8 text chunks.
///
/// A JSON document answer is still classified as a one-shot reply.
pub struct StreamedTransport {
    client: Client,
    endpoint: Url,
}

impl StreamedTransport {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Transport for StreamedTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Streamed
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, session: &str, message: &str) -> mpsc::UnboundedReceiver<ReplyEvent> {
        spawn_request(
            self.client.clone(),
            self.endpoint.clone(),
            TransportKind::Streamed,
            session,
            message,
        )
    }

    async fn health(&self) -> TransportResult<()> {
        check_health(&self.client, &self.endpoint).await
    }
}
