//! HTTP server: the `/chat` endpoint and the widget page.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{ConnectInfo, FromRequestParts, State},
    http::request::Parts,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use crate::AppState;
use crate::bot::{DialogueEngine, KnowledgeBase};
use crate::config::AppConfig;
use crate::protocol::{ChatReply, ChatRequest};
use crate::session::{VisitorStore, WidgetStore};
use crate::transport::VISITOR_HEADER;
use crate::view;
use crate::view::hosted::{self, routes};
use crate::widget::ChatClient;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route(routes::START, post(widget_start_handler))
        .route(routes::SEND, post(widget_send_handler))
        .route(routes::RESTART, post(widget_restart_handler))
        .route(routes::THEME, post(widget_theme_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let knowledge = KnowledgeBase::load(&config.bot.knowledge_base, config.bot.fuzzy_cutoff)?;
    let engine = Arc::new(DialogueEngine::new(knowledge, VisitorStore::new()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(engine, Arc::clone(&config));

    spawn_visitor_cleanup(
        state.engine.visitors().clone(),
        state.widgets.clone(),
        Duration::from_secs(config.bot.visitor_timeout_secs),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Periodically drop visitors and hosted widgets idle for longer than `timeout`.
fn spawn_visitor_cleanup(visitors: VisitorStore, widgets: WidgetStore, timeout: Duration) {
    let period = (timeout / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = visitors.cleanup_expired_with_timeout(timeout);
            let widgets_removed = widgets.cleanup_expired_with_timeout(timeout);
            if removed > 0 || widgets_removed > 0 {
                info!(
                    name: "visitors.expired",
                    removed,
                    widgets_removed,
                    remaining = visitors.len(),
                    "Expired idle visitors"
                );
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractors
// ─────────────────────────────────────────────────────────────────────────────

/// Who is talking: the `x-visitor-id` header, else the peer IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for VisitorId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(VISITOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(id) = header {
            return Ok(Self(id.to_string()));
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(Self(addr.ip().to_string()));
        }

        Ok(Self("anonymous".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /chat - reply to one message; an empty message starts over.
async fn chat_handler(
    State(state): State<AppState>,
    VisitorId(visitor): VisitorId,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    let reply = state.engine.reply(&visitor, &req.message);
    info!(
        name: "chat.reply",
        visitor = %visitor,
        start = req.is_start(),
        end = reply.end,
        "Chat reply sent"
    );
    Json(reply)
}

/// GET / - the widget page for a new visitor; htmx opens the conversation.
async fn index_handler() -> impl IntoResponse {
    let visitor = Uuid::new_v4().to_string();
    Html(hosted::page(&ChatClient::new(), &visitor))
}

/// A control activated on the hosted widget.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WidgetAction {
    Start,
    Send(String),
    Restart,
    ToggleTheme,
}

#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    message: String,
}

/// POST /widget/start
async fn widget_start_handler(
    State(state): State<AppState>,
    VisitorId(visitor): VisitorId,
) -> Html<String> {
    drive_widget(&state, &visitor, WidgetAction::Start)
}

/// POST /widget/send - the form's `message` field.
async fn widget_send_handler(
    State(state): State<AppState>,
    VisitorId(visitor): VisitorId,
    Form(form): Form<SendForm>,
) -> Html<String> {
    drive_widget(&state, &visitor, WidgetAction::Send(form.message))
}

/// POST /widget/restart
async fn widget_restart_handler(
    State(state): State<AppState>,
    VisitorId(visitor): VisitorId,
) -> Html<String> {
    drive_widget(&state, &visitor, WidgetAction::Restart)
}

/// POST /widget/theme
async fn widget_theme_handler(
    State(state): State<AppState>,
    VisitorId(visitor): VisitorId,
) -> Html<String> {
    drive_widget(&state, &visitor, WidgetAction::ToggleTheme)
}

/// Apply `action` to the visitor's widget, answer any request it issues from
/// the engine, and render the result.
fn drive_widget(state: &AppState, visitor: &str, action: WidgetAction) -> Html<String> {
    debug!(name: "widget.action", visitor = %visitor, action = ?action, "Widget control activated");
    let markup = state.widgets.with_widget(visitor, |client| {
        let outgoing = match action {
            WidgetAction::Start => Some(client.start_conversation()),
            WidgetAction::Restart => Some(client.restart()),
            WidgetAction::Send(text) => {
                client.set_input(text);
                client.submit()
            }
            WidgetAction::ToggleTheme => {
                client.toggle_theme();
                None
            }
        };
        if let Some(outgoing) = outgoing {
            let reply = state.engine.reply(visitor, &outgoing.request.message);
            client.receive(outgoing.id, Ok(reply));
        }
        view::to_html(&hosted::hosted(client, visitor).into())
    });
    Html(markup)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "visitors": state.engine.visitors().len(),
        "widgets": state.widgets.len(),
        "knowledge_entries": state.engine.knowledge().len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let (_, config) = AppConfig::load_from_args(["chat-widget"]).unwrap();
        AppState::new(
            Arc::new(DialogueEngine::new(
                KnowledgeBase::default(),
                VisitorStore::new(),
            )),
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn test_visitor_header_is_used() {
        let state = state();
        let app = build_router(state.clone());

        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .header(VISITOR_HEADER, "abc")
            .body(Body::from(r#"{"message":""}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.engine.visitors().get("abc").unwrap().state().step, 1);
    }

    #[tokio::test]
    async fn test_visitor_falls_back_to_anonymous() {
        let state = state();
        let app = build_router(state.clone());

        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":""}"#))
            .unwrap();
        app.oneshot(request).await.unwrap();

        assert!(state.engine.visitors().get("anonymous").is_some());
    }

    #[tokio::test]
    async fn test_widget_send_drives_engine() {
        let state = state();
        let app = build_router(state.clone());

        for (uri, body) in [(routes::START, ""), (routes::SEND, "message=haan")] {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/x-www-form-urlencoded")
                .header(VISITOR_HEADER, "browser")
                .body(Body::from(body))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(state.engine.visitors().get("browser").unwrap().state().step, 2);
        assert_eq!(state.widgets.with_widget("browser", |c| c.messages().len()), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = build_router(state());
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
