//! Line-oriented terminal front-end for the widget.
//!
//! Each stdin line is typed into the input field and submitted. Lines starting
//! with `/` drive the other controls: `/theme`, `/restart`, `/quit`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::transport::HttpTransport;
use crate::view::text::{message_line, status_line};
use crate::widget::{ChatClient, UiEvent, WidgetRuntime};

/// Chat with the server at `base_url` until stdin closes or `/quit`.
pub async fn run(base_url: &str, timeout: Duration) -> anyhow::Result<()> {
    let visitor_id = Uuid::new_v4().to_string();
    let transport =
        HttpTransport::with_timeout(base_url, timeout)?.with_visitor_id(visitor_id.clone());
    info!(
        name: "terminal.connected",
        endpoint = %transport.endpoint(),
        visitor = %visitor_id,
        "Terminal chat started"
    );

    let runtime = WidgetRuntime::new(Arc::new(transport));
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(forward_lines(BufReader::new(tokio::io::stdin()), tx));

    let mut printer = TranscriptPrinter::default();
    runtime
        .run(rx, |client| {
            let mut stdout = std::io::stdout().lock();
            for line in printer.update(client) {
                let _ = writeln!(stdout, "{line}");
            }
            let _ = stdout.flush();
        })
        .await;

    Ok(())
}

/// Feed each line of `input` to the widget, then close it.
///
/// A read error ends input like end-of-file does, but is logged first.
pub async fn forward_lines<R>(input: R, tx: mpsc::Sender<UiEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                for event in parse_line(&line) {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(name: "terminal.input.failed", error = %e, "Could not read input, closing");
                break;
            }
        }
    }
    let _ = tx.send(UiEvent::Close).await;
}

/// Map one input line to widget events.
#[must_use]
pub fn parse_line(line: &str) -> Vec<UiEvent> {
    match line.trim() {
        "/theme" => vec![UiEvent::ToggleTheme],
        "/restart" => vec![UiEvent::Restart],
        "/quit" | "/exit" => vec![UiEvent::Close],
        _ => vec![UiEvent::Input(line.to_string()), UiEvent::Submit],
    }
}

/// Turns successive widget renders into the lines a terminal has not shown yet.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: usize,
    status: Option<String>,
}

impl TranscriptPrinter {
    /// Lines to print for the current state of `client`.
    pub fn update(&mut self, client: &ChatClient) -> Vec<String> {
        let mut out = Vec::new();
        let messages = client.messages();

        if messages.len() < self.printed {
            out.push("── new conversation ──".to_string());
            self.printed = 0;
        }

        out.extend(messages[self.printed..].iter().map(message_line));
        self.printed = messages.len();

        let status = status_line(client);
        if self.status.as_deref() != Some(status.as_str()) {
            out.push(status.clone());
            self.status = Some(status);
        }
        out
    }
}
