//! Request plumbing shared by both transports.
//!
//! The configured transport kind only decides what the client asks for. How
//! a reply is read is decided per response from its `Content-Type`.

use reqwest::{header, Client, Response, Url};
use tokio::sync::mpsc;

use super::{
    read_stream, ChatRequest, ChatResponse, ReplyEvent, TransportError, TransportKind,
    TransportResult,
};

/// Decide how to read a response body.
///
/// JSON media types (`application/json`, `application/*+json`) are read as
/// one document; any other declared type is read as a chunked text stream.
/// `hint` is used when the service declared no type at all.
pub fn negotiate(content_type: Option<&str>, hint: TransportKind) -> TransportKind {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if essence.is_empty() {
        hint
    } else if essence == "application/json" || essence.ends_with("+json") {
        TransportKind::OneShot
    } else {
        TransportKind::Streamed
    }
}

fn accept(hint: TransportKind) -> &'static str {
    match hint {
        TransportKind::OneShot => "application/json, text/plain;q=0.5",
        TransportKind::Streamed => "text/plain, application/json;q=0.5",
    }
}

/// POST a chat message. Non-success statuses become [`TransportError::Status`].
pub(crate) async fn post_chat(
    client: &Client,
    endpoint: &Url,
    hint: TransportKind,
    session: &str,
    message: &str,
) -> TransportResult<Response> {
    let response = client
        .post(endpoint.clone())
        .header(header::ACCEPT, accept(hint))
        .json(&ChatRequest { session, message })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Read the whole body as one [`ChatResponse`].
pub(crate) async fn read_document(response: Response) -> TransportResult<ChatResponse> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Run one request on a spawned task and report it as [`ReplyEvent`]s.
pub(crate) fn spawn_request(
    client: Client,
    endpoint: Url,
    hint: TransportKind,
    session: &str,
    message: &str,
) -> mpsc::UnboundedReceiver<ReplyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = session.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        let terminal = match fetch_reply(&client, &endpoint, hint, &session, &message, &tx).await {
            Ok(event) => event,
            Err(e) => ReplyEvent::Error(e),
        };
        // The receiver is gone if the view was closed; nothing to do then.
        let _ = tx.send(terminal);
    });

    rx
}

/// Perform the request, forwarding stream chunks to `tx`, and return the
/// terminal event.
async fn fetch_reply(
    client: &Client,
    endpoint: &Url,
    hint: TransportKind,
    session: &str,
    message: &str,
    tx: &mpsc::UnboundedSender<ReplyEvent>,
) -> TransportResult<ReplyEvent> {
    let response = post_chat(client, endpoint, hint, session, message).await?;

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let mode = negotiate(content_type.as_deref(), hint);
    if mode != hint {
        tracing::debug!(
            configured = hint.display_name(),
            answered = mode.display_name(),
            content_type = content_type.as_deref().unwrap_or(""),
            "service answered in the other mode"
        );
    }

    match mode {
        TransportKind::OneShot => {
            let document = read_document(response).await?;
            tracing::debug!(
                kind = document.kind.as_deref().unwrap_or("<none>"),
                status = ?document.status,
                revisions = ?document.internal_revisions,
                "received reply"
            );
            Ok(ReplyEvent::Reply(document.classify()))
        }
        TransportKind::Streamed => {
            let mut chunks = 0usize;
            read_stream(response.bytes_stream(), |text| {
                chunks += 1;
                let _ = tx.send(ReplyEvent::Chunk(text));
            })
            .await
            .map_err(|e| TransportError::Stream(e.to_string()))?;

            tracing::debug!(chunks, "stream finished");
            Ok(ReplyEvent::Done)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_types_read_as_document() {
        for value in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/problem+json",
        ] {
            assert_eq!(negotiate(Some(value), TransportKind::Streamed), TransportKind::OneShot);
        }
    }

    #[test]
    fn test_other_types_read_as_stream() {
        for value in ["text/plain", "text/plain; charset=utf-8", "text/event-stream", "text/html"] {
            assert_eq!(negotiate(Some(value), TransportKind::OneShot), TransportKind::Streamed);
        }
    }

    #[test]
    fn test_missing_type_falls_back_to_hint() {
        assert_eq!(negotiate(None, TransportKind::OneShot), TransportKind::OneShot);
        assert_eq!(negotiate(None, TransportKind::Streamed), TransportKind::Streamed);
        assert_eq!(negotiate(Some("  "), TransportKind::Streamed), TransportKind::Streamed);
    }
}
