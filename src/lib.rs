//! Chat Widget
//!
//! A small chat widget and the server it talks to. The widget renders
//! messages, forwards user input to `POST /chat`, toggles a theme, and starts
//! a conversation on load; the server answers with a scripted admissions
//! dialogue backed by a question/answer knowledge base.
//!
//! # Architecture
//!
//! - **Widget**: I/O-free state machine plus an async runtime that drives it
//! - **View**: declarative render to an element tree, serialized to HTML or text
//! - **Transport**: one async seam for the `/chat` call, implemented over HTTP
//! - **Server**: Axum router serving `/chat`, the htmx-driven widget page and
//!   static assets
//!
//! # Modules
//!
//! - [`widget`]: conversation view model and runtime
//! - [`view`]: rendering
//! - [`transport`]: client side of the chat endpoint
//! - [`protocol`]: wire types
//! - [`bot`]: server-side reply logic
//! - [`session`]: per-visitor dialogue state

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod bot;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod terminal;
pub mod transport;
pub mod view;
pub mod widget;

use std::sync::Arc;

use crate::bot::DialogueEngine;
use crate::config::AppConfig;
use crate::session::WidgetStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Reply logic and visitor store.
    pub engine: Arc<DialogueEngine>,
    /// Widgets rendered for browser visitors.
    pub widgets: WidgetStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Arc<DialogueEngine>, config: Arc<AppConfig>) -> Self {
        Self {
            engine,
            widgets: WidgetStore::new(),
            config,
        }
    }
}
