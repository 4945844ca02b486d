//! Wire types for the chat endpoint and classification of replies.

use serde::{Deserialize, Serialize};

/// Text shown when a reply has an unrecognized shape or never arrives.
pub const FALLBACK_REPLY: &str = "Oops! Something went wrong.";

/// Text returned by the one-shot helper when a reply carries no text at all.
pub const NO_RESPONSE: &str = "No response";

/// Request body sent to the chat endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest<'a> {
    pub session: &'a str,
    pub message: &'a str,
}

/// JSON document returned by the chat endpoint.
///
/// Every field is optional so that any JSON object parses; the `kind`
/// discriminator decides which field carries the text.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// "story" or "refusal" on new stories. Informational only, so any JSON
    /// value is accepted.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    /// Number of rewrites the service applied before answering. Also
    /// informational.
    #[serde(default)]
    pub internal_revisions: Option<serde_json::Value>,
}

impl ChatResponse {
    /// First non-empty of `story`, `reply`, `error`, else "No response".
    pub fn best_text(&self) -> &str {
        [&self.story, &self.reply, &self.error]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(NO_RESPONSE)
    }

    /// Classify by the `type` discriminator.
    pub fn classify(self) -> Reply {
        match (self.kind.as_deref(), self.story, self.reply) {
            (Some("story"), Some(story), _) => Reply::Story(story),
            (Some("refined"), Some(story), _) => Reply::Refined(story),
            (Some("chat"), _, Some(reply)) => Reply::Chat(reply),
            _ => Reply::Unrecognized,
        }
    }
}

/// A classified assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A freshly generated story.
    Story(String),
    /// A revision of the previous story. Rendered the same as `Story`.
    Refined(String),
    /// A short conversational reply.
    Chat(String),
    /// Missing or unknown discriminator, or the matching field was absent.
    Unrecognized,
}

impl Reply {
    /// Text to show in the transcript.
    pub fn text(&self) -> &str {
        match self {
            Reply::Story(text) | Reply::Refined(text) | Reply::Chat(text) => text,
            Reply::Unrecognized => FALLBACK_REPLY,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Story(text) | Reply::Refined(text) | Reply::Chat(text) => text,
            Reply::Unrecognized => FALLBACK_REPLY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_serializes_session_and_message() {
        let body = serde_json::to_value(ChatRequest {
            session: "kid-session-01",
            message: "hi",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "session": "kid-session-01", "message": "hi" })
        );
    }

    #[test]
    fn test_classify_story() {
        let reply = parse(r#"{"type":"story","story":"X","internal_revisions":1,"status":"story"}"#)
            .classify();
        assert_eq!(reply, Reply::Story("X".to_string()));
        assert_eq!(reply.text(), "X");
    }

    #[test]
    fn test_odd_informational_fields_still_classify() {
        let reply = parse(
            r#"{"type":"story","story":"X","internal_revisions":"two","status":3.5}"#,
        )
        .classify();
        assert_eq!(reply, Reply::Story("X".to_string()));

        let response = parse(r#"{"type":"chat","reply":"Z","status":null,"internal_revisions":[1]}"#);
        assert_eq!(response.status, None);
        assert_eq!(response.internal_revisions, Some(serde_json::json!([1])));
        assert_eq!(response.classify().text(), "Z");
    }

    #[test]
    fn test_classify_refined_reads_story_field() {
        let reply = parse(r#"{"type":"refined","story":"Y"}"#).classify();
        assert_eq!(reply, Reply::Refined("Y".to_string()));
        assert_eq!(reply.text(), "Y");
    }

    #[test]
    fn test_classify_chat_reads_reply_field() {
        let reply = parse(r#"{"type":"chat","reply":"Z","story":"ignored"}"#).classify();
        assert_eq!(reply.text(), "Z");
    }

    #[test]
    fn test_classify_unknown_type() {
        assert_eq!(parse(r#"{"type":"weird"}"#).classify(), Reply::Unrecognized);
        assert_eq!(parse(r#"{}"#).classify(), Reply::Unrecognized);
        assert_eq!(
            parse(r#"{"type":"error","error":"boom"}"#).classify().text(),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn test_classify_missing_field_is_unrecognized() {
        assert_eq!(parse(r#"{"type":"story"}"#).classify(), Reply::Unrecognized);
        assert_eq!(parse(r#"{"type":"chat","story":"s"}"#).classify(), Reply::Unrecognized);
    }

    #[test]
    fn test_best_text_priority() {
        assert_eq!(parse(r#"{"story":"s","reply":"r","error":"e"}"#).best_text(), "s");
        assert_eq!(parse(r#"{"reply":"r","error":"e"}"#).best_text(), "r");
        assert_eq!(parse(r#"{"error":"e"}"#).best_text(), "e");
        assert_eq!(parse(r#"{}"#).best_text(), NO_RESPONSE);
    }

    #[test]
    fn test_best_text_skips_empty_fields() {
        assert_eq!(parse(r#"{"story":"","reply":"r"}"#).best_text(), "r");
        assert_eq!(parse(r#"{"story":"","reply":"","error":""}"#).best_text(), NO_RESPONSE);
    }
}
