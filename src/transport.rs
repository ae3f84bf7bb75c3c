//! Network seam between the widget and the chat endpoint.
//!
//! [`ChatTransport`] is the one call the widget makes. [`HttpTransport`] sends
//! it to a server over HTTP; tests substitute their own implementations.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{ClientError, Result};
use crate::protocol::{ChatReply, ChatRequest};

/// Header carrying the visitor identity the server keys dialogue state by.
pub const VISITOR_HEADER: &str = "x-visitor-id";

/// How long a request may take before it fails.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one chat request and returns the parsed reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` to the chat endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a reply.
    async fn send(&self, request: ChatRequest) -> Result<ChatReply>;
}

/// HTTP transport for `POST /chat`.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::protocol::ChatRequest;
/// use chat_widget::transport::{ChatTransport, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://127.0.0.1:3000")?;
/// let reply = transport.send(ChatRequest::start()).await?;
/// println!("{}", reply.reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
    visitor_id: Option<String>,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url` with [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a transport whose requests fail after `timeout`.
    ///
    /// Replies are applied in request order, so an unanswered request holds
    /// back every later one until it times out.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let endpoint = Url::parse(base_url.as_ref())?.join("/chat")?;
        Ok(Self {
            endpoint,
            http,
            visitor_id: None,
        })
    }

    /// Identify this client to the server instead of relying on its address.
    #[must_use]
    pub fn with_visitor_id(mut self, visitor_id: impl Into<String>) -> Self {
        self.visitor_id = Some(visitor_id.into());
        self
    }

    /// The full endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn parse_reply(body: &str) -> Result<ChatReply> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        serde_json::from_value(value).map_err(|e| ClientError::InvalidReply(e.to_string()))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: ChatRequest) -> Result<ChatReply> {
        let mut builder = self.http.post(self.endpoint.clone()).json(&request);
        if let Some(visitor_id) = &self.visitor_id {
            builder = builder.header(VISITOR_HEADER, visitor_id);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Self::parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_chat_path() {
        let transport = HttpTransport::new("http://localhost:3000").unwrap();
        assert_eq!(transport.endpoint().as_str(), "http://localhost:3000/chat");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_parse_reply_shapes() {
        let reply = HttpTransport::parse_reply(r#"{"reply":"Bye","end":true}"#).unwrap();
        assert_eq!(reply, ChatReply::closing("Bye"));

        assert!(matches!(
            HttpTransport::parse_reply("<html>"),
            Err(ClientError::Json(_))
        ));
        assert!(matches!(
            HttpTransport::parse_reply(r#"{"text":"Hi"}"#),
            Err(ClientError::InvalidReply(_))
        ));
    }
}
