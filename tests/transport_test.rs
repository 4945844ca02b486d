use mockito::Matcher;
use reqwest::Url;
use serde_json::json;
use tokio::sync::mpsc;

use story_chat::transport::{
    OneShotTransport, Reply, ReplyEvent, StreamedTransport, Transport, TransportError,
    NO_RESPONSE,
};

fn chat_url(server: &mockito::Server) -> Url {
    Url::parse(&format!("{}/chat", server.url())).unwrap()
}

async fn drain(mut rx: mpsc::UnboundedReceiver<ReplyEvent>) -> Vec<ReplyEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

async fn one_shot_text(body: &str) -> String {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    OneShotTransport::new(chat_url(&server))
        .send_message("s1", "hi")
        .await
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helper
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_message_prefers_story() {
    let text = one_shot_text(r#"{"story":"S","reply":"R","error":"E"}"#).await;
    assert_eq!(text, "S");
}

#[tokio::test]
async fn send_message_falls_back_to_reply_then_error() {
    assert_eq!(one_shot_text(r#"{"reply":"R","error":"E"}"#).await, "R");
    assert_eq!(one_shot_text(r#"{"story":"","error":"E"}"#).await, "E");
}

#[tokio::test]
async fn send_message_without_text_says_no_response() {
    assert_eq!(one_shot_text(r#"{"type":"story"}"#).await, NO_RESPONSE);
}

#[tokio::test]
async fn send_message_posts_session_and_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"session": "abc", "message": "Hello"})))
        .with_status(200)
        .with_body(r#"{"type":"chat","reply":"Hi!"}"#)
        .create_async()
        .await;

    let text = OneShotTransport::new(chat_url(&server))
        .send_message("abc", "Hello")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, "Hi!");
}

#[tokio::test]
async fn send_message_reports_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(503)
        .create_async()
        .await;

    let err = OneShotTransport::new(chat_url(&server))
        .send_message("s1", "hi")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status: 503,
            body: String::new()
        }
    );
}

#[tokio::test]
async fn send_message_rejects_non_json() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = OneShotTransport::new(chat_url(&server))
        .send_message("s1", "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)), "{:?}", err);
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport requests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_shot_request_classifies_reply() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"type":"refined","story":"Shorter now."}"#)
        .create_async()
        .await;

    let transport = OneShotTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "shorter please")).await;

    assert_eq!(
        events,
        vec![ReplyEvent::Reply(Reply::Refined("Shorter now.".to_string()))]
    );
}

#[tokio::test]
async fn one_shot_request_with_unknown_type_is_unrecognized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"type":"weird","story":"ignored"}"#)
        .create_async()
        .await;

    let transport = OneShotTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "hi")).await;

    assert_eq!(events, vec![ReplyEvent::Reply(Reply::Unrecognized)]);
}

#[tokio::test]
async fn streamed_request_ends_with_done() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Hello, little one.")
        .create_async()
        .await;

    let transport = StreamedTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "hi")).await;

    let (last, chunks) = events.split_last().unwrap();
    assert_eq!(*last, ReplyEvent::Done);
    let text: String = chunks
        .iter()
        .map(|event| match event {
            ReplyEvent::Chunk(text) => text.as_str(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(text, "Hello, little one.");
}

#[tokio::test]
async fn streamed_request_reports_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(404)
        .with_body("no such route")
        .create_async()
        .await;

    let transport = StreamedTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "hi")).await;

    assert_eq!(
        events,
        vec![ReplyEvent::Error(TransportError::Status {
            status: 404,
            body: "no such route".to_string()
        })]
    );
}

#[tokio::test]
async fn streamed_request_answered_with_json_is_a_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat")
        .match_header("accept", Matcher::Regex("^text/plain".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"type":"chat","reply":"Hello again!"}"#)
        .create_async()
        .await;

    let transport = StreamedTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "hi")).await;

    mock.assert_async().await;
    assert_eq!(
        events,
        vec![ReplyEvent::Reply(Reply::Chat("Hello again!".to_string()))]
    );
}

#[tokio::test]
async fn one_shot_request_answered_with_text_is_a_stream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat")
        .match_header("accept", Matcher::Regex("^application/json".to_string()))
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Hello, little one.")
        .create_async()
        .await;

    let transport = OneShotTransport::new(chat_url(&server));
    let events = drain(transport.request("s1", "hi")).await;

    mock.assert_async().await;
    assert_eq!(events.last(), Some(&ReplyEvent::Done));
    let text: String = events
        .iter()
        .filter_map(|event| match event {
            ReplyEvent::Chunk(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello, little one.");
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_ok() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let transport = OneShotTransport::new(chat_url(&server));
    assert_eq!(transport.health().await, Ok(()));
    mock.assert_async().await;
}

#[tokio::test]
async fn health_not_ok() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"ok":false}"#)
        .create_async()
        .await;

    let transport = StreamedTransport::new(chat_url(&server));
    assert!(transport.health().await.is_err());
}
