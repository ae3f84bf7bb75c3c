//! The chat widget.
//!
//! This module provides the conversation view model and the loop that drives
//! it against the chat endpoint.
//!
//! # Structure
//!
//! - [`ChatClient`]: widget state and operations, free of I/O
//! - [`WidgetRuntime`]: async driver that sends requests and applies replies
//! - [`Message`] / [`Role`]: rendered entries
//! - [`ConversationState`] / [`ThemeState`]: the two widget flags
//!
//! # Example
//!
//! ```rust
//! use chat_widget::protocol::ChatReply;
//! use chat_widget::widget::{ChatClient, Role};
//!
//! let mut client = ChatClient::new();
//! let start = client.start_conversation();
//! client.receive(start.id, Ok(ChatReply::open("Namaste!")));
//!
//! client.set_input("hello");
//! let out = client.submit().unwrap();
//! assert_eq!(client.messages()[1].role(), Role::User);
//!
//! client.receive(out.id, Ok(ChatReply::closing("Bye")));
//! assert!(client.is_restart_visible());
//! ```

mod client;
mod message;
pub mod runtime;
mod state;

pub use client::{ChatClient, Delivery, Outgoing, RequestId, RequestKind};
pub use message::{Message, Role};
pub use runtime::{UiEvent, WidgetRuntime};
pub use state::{ConversationState, ThemeState};
