//! The chat widget core.
//!
//! [`ChatClient`] holds everything the page shows: the message sequence, the
//! conversation and theme flags, the input field and the restart control. It
//! performs no I/O. Operations that need the server return an [`Outgoing`]
//! which the driver sends and later hands back to [`ChatClient::receive`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::message::{Message, Role};
use super::state::{ConversationState, ThemeState};
use crate::error::ClientError;
use crate::protocol::{ChatReply, ChatRequest};

/// Identifies one request to the chat endpoint.
///
/// `epoch` is bumped by every conversation start, `seq` is monotonic across
/// the lifetime of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId {
    epoch: u64,
    seq: u64,
}

impl RequestId {
    #[must_use]
    pub fn epoch(self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.epoch, self.seq)
    }
}

/// Why a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Synthetic empty message that opens a conversation.
    Start,
    /// A user message.
    Message,
}

/// A request the driver must send on behalf of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub id: RequestId,
    pub kind: RequestKind,
    pub request: ChatRequest,
}

/// What became of an outcome handed to [`ChatClient::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Applied, possibly together with buffered later outcomes.
    Applied,
    /// Held until an earlier request resolves.
    Buffered,
    /// Belongs to a conversation that was restarted, or is unknown.
    Discarded,
}

/// Widget state for one page lifetime.
#[derive(Debug)]
pub struct ChatClient {
    messages: Vec<Message>,
    conversation: ConversationState,
    theme: ThemeState,
    input: String,
    input_enabled: bool,
    restart_visible: bool,
    scroll_anchor: Option<usize>,
    epoch: u64,
    next_seq: u64,
    in_flight: BTreeMap<u64, RequestKind>,
    ready: BTreeMap<u64, Result<ChatReply, ClientError>>,
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatClient {
    /// Create an empty widget. Call [`start_conversation`](Self::start_conversation)
    /// to open the first conversation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            conversation: ConversationState::Active,
            theme: ThemeState::default(),
            input: String::new(),
            input_enabled: true,
            restart_visible: false,
            scroll_anchor: None,
            epoch: 0,
            next_seq: 0,
            in_flight: BTreeMap::new(),
            ready: BTreeMap::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Reset the view and request a fresh conversation.
    ///
    /// Every call clears messages, re-enables input, hides the restart
    /// control and orphans requests still in flight.
    pub fn start_conversation(&mut self) -> Outgoing {
        self.messages.clear();
        self.scroll_anchor = None;
        self.conversation = ConversationState::Active;
        self.input_enabled = true;
        self.restart_visible = false;

        self.epoch += 1;
        if !self.in_flight.is_empty() {
            debug!(
                name: "widget.requests.orphaned",
                count = self.in_flight.len(),
                epoch = self.epoch,
                "Dropping in-flight requests from previous conversation"
            );
        }
        self.in_flight.clear();
        self.ready.clear();

        self.issue(RequestKind::Start, ChatRequest::start())
    }

    /// Append the user's message and request a reply for it.
    ///
    /// `text` is expected to be trimmed and non-empty; see [`submit`](Self::submit).
    pub fn send_message(&mut self, text: impl Into<String>) -> Outgoing {
        let text = text.into();
        self.append_message(Role::User, text.clone());
        self.issue(RequestKind::Message, ChatRequest::new(text))
    }

    /// Append a message to the end of the view and scroll to it.
    pub fn append_message(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(Message::new(role, text));
        self.scroll_anchor = Some(self.messages.len() - 1);
    }

    /// Flip the theme.
    pub fn toggle_theme(&mut self) {
        self.theme.toggle();
    }

    /// Replace the contents of the input field.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submit the input field.
    ///
    /// Returns `None` when the field is disabled or blank after trimming.
    pub fn submit(&mut self) -> Option<Outgoing> {
        if !self.input_enabled {
            return None;
        }
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        let outgoing = self.send_message(text);
        self.input.clear();
        Some(outgoing)
    }

    /// Restart the conversation.
    pub fn restart(&mut self) -> Outgoing {
        self.start_conversation()
    }

    /// Hand back the outcome of an [`Outgoing`].
    ///
    /// Outcomes are applied in the order their requests were issued; an
    /// outcome for a previous conversation is dropped.
    ///
    /// A request that never resolves blocks every later outcome, so drivers
    /// must guarantee each request ends in a reply or an error (see
    /// [`HttpTransport::with_timeout`](crate::transport::HttpTransport::with_timeout)).
    pub fn receive(
        &mut self,
        id: RequestId,
        outcome: Result<ChatReply, ClientError>,
    ) -> Delivery {
        if id.epoch != self.epoch || !self.in_flight.contains_key(&id.seq) {
            debug!(name: "widget.reply.stale", request_id = %id, "Discarding stale reply");
            return Delivery::Discarded;
        }

        self.ready.insert(id.seq, outcome);

        let mut applied = false;
        while let Some((&seq, _)) = self.in_flight.first_key_value() {
            let Some(outcome) = self.ready.remove(&seq) else {
                break;
            };
            if let Some(kind) = self.in_flight.remove(&seq) {
                self.apply(kind, outcome);
                applied = true;
            }
        }

        if applied {
            Delivery::Applied
        } else {
            Delivery::Buffered
        }
    }

    fn issue(&mut self, kind: RequestKind, request: ChatRequest) -> Outgoing {
        self.next_seq += 1;
        let id = RequestId {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.in_flight.insert(id.seq, kind);
        Outgoing { id, kind, request }
    }

    fn apply(&mut self, kind: RequestKind, outcome: Result<ChatReply, ClientError>) {
        match outcome {
            Ok(reply) => {
                self.append_message(Role::Assistant, reply.reply);
                if reply.end && kind == RequestKind::Message {
                    self.end_conversation();
                }
            }
            Err(e) => {
                warn!(name: "widget.request.failed", error = %e, "Chat request failed");
                self.append_message(Role::Notice, format!("Could not reach the assistant: {e}"));
            }
        }
    }

    fn end_conversation(&mut self) {
        self.conversation = ConversationState::Ended;
        self.input_enabled = false;
        self.restart_visible = true;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn conversation(&self) -> ConversationState {
        self.conversation
    }

    #[must_use]
    pub fn theme(&self) -> ThemeState {
        self.theme
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    #[must_use]
    pub fn is_restart_visible(&self) -> bool {
        self.restart_visible
    }

    /// Index of the message the view should be scrolled to.
    #[must_use]
    pub fn scroll_anchor(&self) -> Option<usize> {
        self.scroll_anchor
    }

    /// Number of requests issued in this conversation that are not yet applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }
}
