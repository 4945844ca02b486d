//! Errors raised while talking to the storytelling service.

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while requesting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not reach the service (refused, DNS, timeout).
    Connect(String),

    /// The service answered with a non-success status.
    Status { status: u16, body: String },

    /// The response body was not the expected JSON document.
    Decode(String),

    /// The response stream failed part way through.
    Stream(String),

    /// The request task ended without reporting a result.
    Closed,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "Could not reach the storyteller: {}", msg),
            Self::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "Service error ({})", status)
                } else {
                    write!(f, "Service error ({}): {}", status, body)
                }
            }
            Self::Decode(msg) => write!(f, "Malformed response: {}", msg),
            Self::Stream(msg) => write!(f, "Stream interrupted: {}", msg),
            Self::Closed => write!(f, "Request ended without a reply"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::Connect("request timed out".to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() {
            Self::Stream(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
