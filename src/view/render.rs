//! Declarative mapping from widget state to an element tree.

use super::node::{Element, Node};
use crate::widget::{ChatClient, Message};

/// Element ids the page contract relies on.
pub mod ids {
    pub const WIDGET: &str = "chat-widget";
    pub const WINDOW: &str = "chat-window";
    pub const FORM: &str = "chat-form";
    pub const INPUT: &str = "user-input";
    pub const RESTART: &str = "restart-btn";
    pub const THEME_TOGGLE: &str = "theme-toggle";
}

/// Render the whole widget.
#[must_use]
pub fn render(client: &ChatClient) -> Element {
    let theme = client.theme();
    let class = if theme.is_dark() {
        "chat-widget dark"
    } else {
        "chat-widget"
    };

    Element::new("div")
        .attr("id", ids::WIDGET)
        .attr("class", class)
        .child(
            Element::new("header").attr("class", "chat-header").child(
                Element::new("button")
                    .attr("id", ids::THEME_TOGGLE)
                    .attr("type", "button")
                    .child(Node::text(theme.label())),
            ),
        )
        .child(message_list(client))
        .child(
            Element::new("button")
                .attr("id", ids::RESTART)
                .attr("type", "button")
                .flag("hidden", !client.is_restart_visible())
                .child(Node::text("Restart")),
        )
        .child(input_form(client))
}

fn message_list(client: &ChatClient) -> Element {
    let mut window = Element::new("div")
        .attr("id", ids::WINDOW)
        .attr("class", "chat-window");
    if let Some(anchor) = client.scroll_anchor() {
        window = window.attr("data-scroll-to", anchor.to_string());
    }
    window.children(client.messages().iter().map(|m| message(m).into()))
}

/// Render one message as `div.message.<role> > div.bubble`.
#[must_use]
pub fn message(message: &Message) -> Element {
    Element::new("div")
        .attr("class", format!("message {}", message.role()))
        .child(
            Element::new("div")
                .attr("class", "bubble")
                .child(Node::text(message.text())),
        )
}

fn input_form(client: &ChatClient) -> Element {
    let disabled = !client.is_input_enabled();
    Element::new("form")
        .attr("id", ids::FORM)
        .attr("class", "chat-form")
        .child(
            Element::new("input")
                .attr("id", ids::INPUT)
                .attr("type", "text")
                .attr("name", "message")
                .attr("autocomplete", "off")
                .attr("placeholder", "Type your message...")
                .attr("value", client.input())
                .flag("disabled", disabled),
        )
        .child(
            Element::new("button")
                .attr("type", "submit")
                .flag("disabled", disabled)
                .child(Node::text("Send")),
        )
}
