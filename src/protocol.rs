//! Wire types for the `/chat` endpoint.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::protocol::{ChatReply, ChatRequest};
//!
//! let start = ChatRequest::start();
//! assert!(start.is_start());
//!
//! let reply: ChatReply = serde_json::from_str(r#"{"reply":"Hi"}"#).unwrap();
//! assert!(!reply.end);
//! ```

use serde::{Deserialize, Serialize};

/// Request body for `POST /chat`.
///
/// An empty `message` asks the server to start a new conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message content.
    #[serde(default)]
    pub message: String,
}

impl ChatRequest {
    /// Request carrying a user message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The synthetic "start" request.
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }

    /// Whether this request starts a new conversation.
    #[must_use]
    pub fn is_start(&self) -> bool {
        self.message.is_empty()
    }
}

/// Response body from `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text, rendered verbatim.
    pub reply: String,
    /// End-of-conversation signal.
    #[serde(default)]
    pub end: bool,
}

impl ChatReply {
    /// A reply that keeps the conversation open.
    pub fn open(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            end: false,
        }
    }

    /// A reply that ends the conversation.
    pub fn closing(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            end: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_defaults_to_false() {
        let reply: ChatReply = serde_json::from_str(r#"{"reply":"Hi"}"#).unwrap();
        assert_eq!(reply, ChatReply::open("Hi"));
    }

    #[test]
    fn test_reply_field_is_required() {
        let result = serde_json::from_str::<ChatReply>(r#"{"end":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_start_request_serializes_empty_message() {
        let json = serde_json::to_string(&ChatRequest::start()).unwrap();
        assert_eq!(json, r#"{"message":""}"#);
    }

    #[test]
    fn test_missing_message_is_start() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_start());
    }
}
