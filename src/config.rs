use std::path::Path;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Environment prefix for configuration keys (`CHAT_SERVER__PORT=8000`).
pub const ENV_PREFIX: &str = "CHAT";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST", global = true)]
    pub host: Option<String>,

    /// Knowledge base JSON file
    #[arg(long, env = "KNOWLEDGE_BASE", global = true)]
    pub knowledge_base: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat server (default)
    Serve,
    /// Chat with a server from the terminal
    Chat {
        /// Server base URL
        #[arg(long, env = "CHAT_URL")]
        url: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub bot: BotConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub knowledge_base: String,
    pub fuzzy_cutoff: f64,
    pub visitor_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Seconds before a `/chat` request is abandoned.
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<(Cli, Self), config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Parse `args` and build the layered configuration.
    ///
    /// Priority: CLI flag > CLI env var > `CHAT_` env var > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<(Cli, Self), config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        let cfg = Self::build(&cli)?;
        Ok((cli, cfg))
    }

    fn build(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("bot.knowledge_base", "knowledge_base.json")?
            .set_default("bot.fuzzy_cutoff", crate::bot::DEFAULT_CUTOFF)?
            .set_default("bot.visitor_timeout_secs", 30 * 60)?
            .set_default("client.base_url", "http://127.0.0.1:3000")?
            .set_default("client.timeout_secs", 30)?;

        // Explicit file must exist; ./config.yaml is picked up when present.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config.yaml").required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(kb) = &cli.knowledge_base {
            builder = builder.set_override("bot.knowledge_base", kb.as_str())?;
        }
        if let Some(Command::Chat { url: Some(url) }) = &cli.command {
            builder = builder.set_override("client.base_url", url.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
