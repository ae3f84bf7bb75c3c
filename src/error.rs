//! Error types.

use thiserror::Error;

/// Errors raised while talking to the chat endpoint.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body returned by the server.
        message: String,
    },

    /// Body parsed but does not have the reply shape.
    #[error("Invalid reply: {0}")]
    InvalidReply(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while loading the knowledge base.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a JSON array of entries.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
