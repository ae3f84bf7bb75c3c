//! The widget as served to browsers.
//!
//! The server keeps the [`ChatClient`] and htmx posts each control to a
//! `/widget/*` route, swapping the returned markup in place of the widget.

use serde_json::{Map, Value};

use super::html::{document, to_html};
use super::node::Element;
use super::render::{ids, render};
use crate::transport::VISITOR_HEADER;
use crate::widget::ChatClient;

/// htmx build loaded by the page.
pub const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.8";

/// Routes the hosted widget posts to.
pub mod routes {
    pub const START: &str = "/widget/start";
    pub const SEND: &str = "/widget/send";
    pub const RESTART: &str = "/widget/restart";
    pub const THEME: &str = "/widget/theme";
}

const SWAP: &str = "outerHTML scroll:#chat-window:bottom";

/// Render the widget with its controls wired to the server.
///
/// Every request carries `visitor_id` in the visitor header and replaces the
/// widget root with the response.
#[must_use]
pub fn hosted(client: &ChatClient, visitor_id: &str) -> Element {
    let mut root = render(client)
        .attr("hx-headers", visitor_headers(visitor_id))
        .attr("hx-target", "this")
        .attr("hx-swap", SWAP);

    for (id, route) in [
        (ids::THEME_TOGGLE, routes::THEME),
        (ids::RESTART, routes::RESTART),
        (ids::FORM, routes::SEND),
    ] {
        if let Some(el) = root.find_by_id_mut(id) {
            el.set_attr("hx-post", route);
        }
    }
    root
}

/// Hidden element that opens the conversation once the page loads.
#[must_use]
pub fn boot(visitor_id: &str) -> Element {
    Element::new("div")
        .attr("hx-post", routes::START)
        .attr("hx-trigger", "load")
        .attr("hx-target", format!("#{}", ids::WIDGET))
        .attr("hx-swap", SWAP)
        .attr("hx-headers", visitor_headers(visitor_id))
        .flag("hidden", true)
}

/// The full page for a new visitor.
#[must_use]
pub fn page(client: &ChatClient, visitor_id: &str) -> String {
    let body = format!(
        "{}\n    {}\n    <script src=\"{HTMX_SRC}\"></script>",
        to_html(&hosted(client, visitor_id).into()),
        to_html(&boot(visitor_id).into()),
    );
    document("Chat", &body)
}

fn visitor_headers(visitor_id: &str) -> String {
    let mut headers = Map::new();
    headers.insert(VISITOR_HEADER.to_string(), Value::from(visitor_id));
    Value::Object(headers).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ChatReply;

    #[test]
    fn test_controls_post_to_widget_routes() {
        let root = hosted(&ChatClient::new(), "v-1");

        assert_eq!(root.get_attr("hx-target"), Some("this"));
        assert_eq!(root.get_attr("hx-headers"), Some(r#"{"x-visitor-id":"v-1"}"#));
        let post = |id: &str| root.find_by_id(id).unwrap().get_attr("hx-post");
        assert_eq!(post(ids::THEME_TOGGLE), Some(routes::THEME));
        assert_eq!(post(ids::RESTART), Some(routes::RESTART));
        assert_eq!(post(ids::FORM), Some(routes::SEND));
    }

    #[test]
    fn test_ended_widget_stays_ended_when_hosted() {
        let mut client = ChatClient::new();
        let start = client.start_conversation();
        client.receive(start.id, Ok(ChatReply::open("Namaste!")));
        client.set_input("nahi");
        let out = client.submit().unwrap();
        client.receive(out.id, Ok(ChatReply::closing("Bye")));

        let root = hosted(&client, "v-1");
        assert!(!root.find_by_id(ids::RESTART).unwrap().has_attr("hidden"));
        assert!(root.find_by_id(ids::INPUT).unwrap().has_attr("disabled"));
        assert_eq!(
            root.find_by_id(ids::WINDOW).unwrap().children.len(),
            client.messages().len()
        );
    }

    #[test]
    fn test_page_boots_conversation() {
        let html = page(&ChatClient::new(), "v-1");
        assert!(html.contains(&format!(r#"<script src="{HTMX_SRC}"></script>"#)));
        assert!(html.contains(r#"hx-post="/widget/start" hx-trigger="load""#));
        assert!(html.contains("&quot;x-visitor-id&quot;:&quot;v-1&quot;"));
        assert!(!html.contains("method="));
    }

    #[test]
    fn test_set_attr_replaces_value() {
        let mut el = Element::new("div").attr("class", "a");
        el.set_attr("class", "b");
        el.set_attr("id", "x");
        assert_eq!(el.attrs.len(), 2);
        assert_eq!(el.get_attr("class"), Some("b"));
    }
}
