//! Event loop that drives a [`ChatClient`] against a [`ChatTransport`].
//!
//! The client is owned by the loop and never shared. Requests run on spawned
//! tasks; their outcomes come back over a channel and are applied on the loop,
//! so a render callback always sees a consistent widget.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::client::{ChatClient, Delivery, Outgoing, RequestId};
use crate::error::ClientError;
use crate::protocol::ChatReply;
use crate::transport::ChatTransport;

type Outcome = (RequestId, Result<ChatReply, ClientError>);

/// User interactions the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The text field now holds this value.
    Input(String),
    /// The form was submitted.
    Submit,
    /// The restart control was activated.
    Restart,
    /// The theme toggle was activated.
    ToggleTheme,
    /// The page is going away.
    Close,
}

/// Owns one widget and its in-flight requests.
pub struct WidgetRuntime {
    client: ChatClient,
    transport: Arc<dyn ChatTransport>,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl std::fmt::Debug for WidgetRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRuntime")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl WidgetRuntime {
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            client: ChatClient::new(),
            transport,
            outcomes_tx,
            outcomes_rx,
        }
    }

    /// The widget as it currently renders.
    #[must_use]
    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Open a conversation (page load).
    pub fn start(&mut self) {
        let outgoing = self.client.start_conversation();
        self.dispatch(outgoing);
    }

    /// Apply one UI event. Returns `false` once the widget is closing.
    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Input(text) => self.client.set_input(text),
            UiEvent::Submit => {
                if let Some(outgoing) = self.client.submit() {
                    self.dispatch(outgoing);
                }
            }
            UiEvent::Restart => {
                let outgoing = self.client.restart();
                self.dispatch(outgoing);
            }
            UiEvent::ToggleTheme => self.client.toggle_theme(),
            UiEvent::Close => return false,
        }
        true
    }

    /// Wait for the next request to finish and apply it.
    pub async fn next_outcome(&mut self) -> Delivery {
        match self.outcomes_rx.recv().await {
            Some((id, outcome)) => self.client.receive(id, outcome),
            None => Delivery::Discarded,
        }
    }

    /// Wait until every request of the current conversation is applied.
    pub async fn settle(&mut self) {
        while self.client.pending() > 0 {
            self.next_outcome().await;
        }
    }

    /// Run until `events` closes or yields [`UiEvent::Close`].
    ///
    /// Starts the conversation first, then calls `render` after every change.
    pub async fn run<R>(mut self, mut events: mpsc::Receiver<UiEvent>, mut render: R)
    where
        R: FnMut(&ChatClient),
    {
        info!(name: "widget.started", "Chat widget started");
        self.start();
        render(&self.client);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if !self.handle(event) {
                        break;
                    }
                }
                Some((id, outcome)) = self.outcomes_rx.recv() => {
                    self.client.receive(id, outcome);
                }
            }
            render(&self.client);
        }

        info!(
            name: "widget.stopped",
            pending = self.client.pending(),
            "Chat widget stopped"
        );
    }

    fn dispatch(&self, outgoing: Outgoing) {
        let Outgoing { id, kind, request } = outgoing;
        debug!(name: "widget.request.sent", request_id = %id, kind = ?kind, "Sending chat request");

        let transport = Arc::clone(&self.transport);
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let outcome = transport.send(request).await;
            // Receiver gone means the widget was dropped.
            let _ = tx.send((id, outcome));
        });
    }
}
