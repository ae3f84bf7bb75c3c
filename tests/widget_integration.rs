use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chat_widget::AppState;
use chat_widget::bot::script::ADMISSIONS;
use chat_widget::bot::{DialogueEngine, KnowledgeBase};
use chat_widget::config::AppConfig;
use chat_widget::error::{ClientError, Result};
use chat_widget::protocol::{ChatReply, ChatRequest};
use chat_widget::server::build_router;
use chat_widget::session::VisitorStore;
use chat_widget::transport::{ChatTransport, HttpTransport};
use chat_widget::view::{self, ids};
use chat_widget::widget::{ConversationState, Delivery, Role, UiEvent, WidgetRuntime};

/// Serve the real router on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let (_, config) = AppConfig::load_from_args(["chat-widget"]).expect("config");
    let state = AppState::new(
        Arc::new(DialogueEngine::new(
            KnowledgeBase::default(),
            VisitorStore::new(),
        )),
        Arc::new(config),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });
    format!("http://{addr}")
}

/// Accept connections and never answer them.
async fn spawn_silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

/// Answers each message after a fixed delay and records what it was sent.
#[derive(Default)]
struct StubTransport {
    delays: HashMap<String, Duration>,
    sent: Mutex<Vec<String>>,
}

impl StubTransport {
    fn with_delay(mut self, message: &str, delay: Duration) -> Self {
        self.delays.insert(message.to_string(), delay);
        self
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send(&self, request: ChatRequest) -> Result<ChatReply> {
        self.sent.lock().unwrap().push(request.message.clone());
        if let Some(delay) = self.delays.get(&request.message) {
            tokio::time::sleep(*delay).await;
        }
        if request.is_start() {
            Ok(ChatReply::open("Namaste!"))
        } else {
            Ok(ChatReply::open(format!("re: {}", request.message)))
        }
    }
}

struct DownTransport;

#[async_trait]
impl ChatTransport for DownTransport {
    async fn send(&self, _request: ChatRequest) -> Result<ChatReply> {
        Err(ClientError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }
}

fn transcript(runtime: &WidgetRuntime) -> Vec<(Role, String)> {
    runtime
        .client()
        .messages()
        .iter()
        .map(|m| (m.role(), m.text().to_string()))
        .collect()
}

#[tokio::test]
async fn test_load_then_hello_against_server() {
    let base_url = spawn_server().await;
    let transport = HttpTransport::new(&base_url)
        .unwrap()
        .with_visitor_id("scenario");
    let mut runtime = WidgetRuntime::new(Arc::new(transport));

    runtime.start();
    runtime.settle().await;
    assert_eq!(
        transcript(&runtime),
        vec![(Role::Assistant, ADMISSIONS.questions[0].prompt.to_string())]
    );

    runtime.handle(UiEvent::Input("hello".to_string()));
    runtime.handle(UiEvent::Submit);
    assert_eq!(
        transcript(&runtime).last(),
        Some(&(Role::User, "hello".to_string()))
    );
    assert_eq!(runtime.client().input(), "");

    runtime.settle().await;
    let messages = transcript(&runtime);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], (Role::User, "hello".to_string()));
    assert_eq!(messages[2].0, Role::Assistant);
}

#[tokio::test]
async fn test_refusal_ends_then_restart_against_server() {
    let base_url = spawn_server().await;
    let transport = HttpTransport::new(&base_url)
        .unwrap()
        .with_visitor_id("refuser");
    let mut runtime = WidgetRuntime::new(Arc::new(transport));

    runtime.start();
    runtime.settle().await;
    runtime.handle(UiEvent::Input("nahi".to_string()));
    runtime.handle(UiEvent::Submit);
    runtime.settle().await;

    let client = runtime.client();
    assert_eq!(client.conversation(), ConversationState::Ended);
    assert!(!client.is_input_enabled());
    assert!(client.is_restart_visible());
    let html = view::to_html(&view::render(client).into());
    assert!(html.contains(r#"<input id="user-input""#));
    assert!(!html.contains(r#"<button id="restart-btn" type="button" hidden>"#));

    // Input is ignored while ended.
    runtime.handle(UiEvent::Input("haan".to_string()));
    runtime.handle(UiEvent::Submit);
    assert_eq!(runtime.client().pending(), 0);

    runtime.handle(UiEvent::Restart);
    assert!(runtime.client().messages().is_empty());
    runtime.settle().await;

    let client = runtime.client();
    assert_eq!(client.conversation(), ConversationState::Active);
    assert!(client.is_input_enabled());
    assert!(!client.is_restart_visible());
    assert_eq!(client.messages().len(), 1);
    let root = view::render(client);
    assert!(root.find_by_id(ids::RESTART).unwrap().has_attr("hidden"));
}

#[tokio::test]
async fn test_blank_submit_sends_nothing() {
    let transport = Arc::new(StubTransport::default());
    let shared: Arc<StubTransport> = Arc::clone(&transport);
    let mut runtime = WidgetRuntime::new(shared);
    runtime.start();
    runtime.settle().await;

    runtime.handle(UiEvent::Input("   ".to_string()));
    runtime.handle(UiEvent::Submit);

    assert_eq!(runtime.client().pending(), 0);
    assert_eq!(runtime.client().messages().len(), 1);
    assert_eq!(transport.sent(), vec![String::new()]);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_replies_apply_in_request_order() {
    let transport = StubTransport::default()
        .with_delay("first", Duration::from_millis(50))
        .with_delay("second", Duration::from_millis(10));
    let mut runtime = WidgetRuntime::new(Arc::new(transport));
    runtime.start();
    runtime.settle().await;

    for text in ["first", "second"] {
        runtime.handle(UiEvent::Input(text.to_string()));
        runtime.handle(UiEvent::Submit);
    }

    assert_eq!(runtime.next_outcome().await, Delivery::Buffered);
    assert_eq!(runtime.next_outcome().await, Delivery::Applied);

    let texts: Vec<String> = transcript(&runtime).into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        texts,
        vec!["Namaste!", "first", "second", "re: first", "re: second"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reply_from_before_restart_is_dropped() {
    let transport = StubTransport::default().with_delay("slow", Duration::from_millis(50));
    let mut runtime = WidgetRuntime::new(Arc::new(transport));
    runtime.start();
    runtime.settle().await;

    runtime.handle(UiEvent::Input("slow".to_string()));
    runtime.handle(UiEvent::Submit);
    runtime.handle(UiEvent::Restart);
    runtime.settle().await;

    assert_eq!(runtime.next_outcome().await, Delivery::Discarded);
    assert_eq!(
        transcript(&runtime),
        vec![(Role::Assistant, "Namaste!".to_string())]
    );
}

#[tokio::test]
async fn test_failure_renders_notice_and_keeps_input() {
    let mut runtime = WidgetRuntime::new(Arc::new(DownTransport));
    runtime.start();
    runtime.settle().await;

    let client = runtime.client();
    assert_eq!(client.messages().len(), 1);
    assert_eq!(client.messages()[0].role(), Role::Notice);
    assert!(client.messages()[0].text().contains("503"));
    assert!(client.is_input_enabled());
    assert!(!client.is_restart_visible());
}

#[tokio::test]
async fn test_timed_out_request_releases_later_replies() {
    let base_url = spawn_silent_server().await;
    let transport = HttpTransport::with_timeout(&base_url, Duration::from_millis(200)).unwrap();
    let mut runtime = WidgetRuntime::new(Arc::new(transport));

    runtime.start();
    runtime.handle(UiEvent::Input("hello".to_string()));
    runtime.handle(UiEvent::Submit);
    runtime.settle().await;

    let messages = transcript(&runtime);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].0, Role::Notice);
    assert_eq!(messages[1], (Role::User, "hello".to_string()));
    assert_eq!(messages[2].0, Role::Notice);
    assert_eq!(runtime.client().pending(), 0);
    assert!(runtime.client().is_input_enabled());
}

#[tokio::test]
async fn test_run_loop_renders_until_close() {
    let runtime = WidgetRuntime::new(Arc::new(StubTransport::default()));
    let (tx, rx) = tokio::sync::mpsc::channel(8);

    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    let handle = tokio::spawn(runtime.run(rx, move |client| {
        sink.lock().unwrap().push(client.messages().len());
    }));

    tx.send(UiEvent::ToggleTheme).await.unwrap();
    tx.send(UiEvent::Close).await.unwrap();
    handle.await.unwrap();

    // Initial render plus one for the theme toggle; Close does not render.
    let renders = renders.lock().unwrap();
    assert!(renders.len() >= 2);
    assert_eq!(renders[0], 0);
}
