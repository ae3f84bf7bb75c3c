//! Plain-text rendering for terminals.

use crate::widget::{ChatClient, Message, Role};

/// One message as a transcript line. Multi-line replies are indented.
#[must_use]
pub fn message_line(message: &Message) -> String {
    let prefix = match message.role() {
        Role::User => "you",
        Role::Assistant => "bot",
        Role::Notice => "!!",
    };
    let mut lines = message.text().lines();
    let first = lines.next().unwrap_or_default();
    let mut out = format!("{prefix:>3} > {first}");
    for line in lines {
        out.push('\n');
        out.push_str("      ");
        out.push_str(line);
    }
    out
}

/// Status line describing the controls the widget currently offers.
#[must_use]
pub fn status_line(client: &ChatClient) -> String {
    let theme = if client.theme().is_dark() { "dark" } else { "light" };
    if client.is_restart_visible() {
        format!("[conversation ended, /restart to begin again | theme: {theme}]")
    } else {
        format!("[theme: {theme}]")
    }
}

/// Whole transcript, one message per entry.
#[must_use]
pub fn to_text(client: &ChatClient) -> String {
    client
        .messages()
        .iter()
        .map(message_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ChatReply;

    #[test]
    fn test_multiline_reply_is_indented() {
        let mut client = ChatClient::new();
        let start = client.start_conversation();
        client.receive(start.id, Ok(ChatReply::open("Fees:\n- Tuition")));
        client.send_message("ok");

        assert_eq!(to_text(&client), "bot > Fees:\n      - Tuition\nyou > ok");
    }

    #[test]
    fn test_status_line_mentions_restart_when_ended() {
        let mut client = ChatClient::new();
        let start = client.start_conversation();
        client.receive(start.id, Ok(ChatReply::open("Namaste!")));
        assert_eq!(status_line(&client), "[theme: light]");

        let out = client.send_message("no");
        client.receive(out.id, Ok(ChatReply::closing("Bye")));
        assert!(status_line(&client).contains("/restart"));
    }
}
