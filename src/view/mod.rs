//! Rendering for the chat widget.
//!
//! [`render`] maps a [`ChatClient`](crate::widget::ChatClient) to an abstract
//! element tree. The tree can be asserted on directly, serialized to HTML with
//! [`to_html`], or the widget can be printed as a transcript with [`to_text`].
//! [`hosted`] wires the same tree to the server for browsers.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::view::{self, ids};
//! use chat_widget::widget::ChatClient;
//!
//! let client = ChatClient::new();
//! let root = view::render(&client);
//! assert!(root.find_by_id(ids::RESTART).unwrap().has_attr("hidden"));
//!
//! let html = view::to_html(&root.into());
//! assert!(html.contains(r#"id="chat-window""#));
//! ```

pub mod hosted;
mod html;
mod node;
mod render;
pub mod text;

pub use html::{document, escape, to_html};
pub use node::{Element, Node};
pub use render::{ids, message, render};
pub use text::to_text;
