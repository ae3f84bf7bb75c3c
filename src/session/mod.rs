//! Visitor state for the dialogue engine.
//!
//! The server keeps one [`Visitor`] per client identity. Each holds the
//! visitor's position in the scripted dialogue; idle visitors are dropped by
//! [`VisitorStore::cleanup_expired_with_timeout`]. Browser visitors also get a
//! server-side widget in the [`WidgetStore`].
//!
//! # Example
//!
//! ```rust
//! use chat_widget::session::VisitorStore;
//!
//! let store = VisitorStore::new();
//! let visitor = store.get_or_create("127.0.0.1");
//! visitor.with_state(|state| state.step = 1);
//!
//! assert_eq!(store.get("127.0.0.1").unwrap().state().step, 1);
//! ```

mod visitor;
mod widgets;

pub use visitor::{DEFAULT_VISITOR_TIMEOUT, DialogueState, Visitor, VisitorStore};
pub use widgets::WidgetStore;
