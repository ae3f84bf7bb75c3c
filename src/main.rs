//! Chat Widget
//!
//! Entry point: `serve` runs the chat server, `chat` runs the terminal widget.

use std::sync::Arc;
use std::time::Duration;

use chat_widget::config::{AppConfig, Command};
use chat_widget::{server, telemetry, terminal};
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing::info;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let (cli, config) = match AppConfig::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init(cli.log_json);

    let result = match cli.command {
        Some(Command::Chat { .. }) => {
            let timeout = Duration::from_secs(config.client.timeout_secs);
            terminal::run(&config.client.base_url, timeout).await
        }
        Some(Command::Serve) | None => {
            info!(
                name: "config.loaded",
                host = %config.server.host,
                port = config.server.port,
                knowledge_base = %config.bot.knowledge_base,
                "Configuration loaded"
            );
            server::start_server(Arc::new(config)).await
        }
    };

    if let Err(e) = result {
        tracing::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}
