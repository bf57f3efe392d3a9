use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_WEBAPP_URL: &str = "https://t.me/Escrowflow_bot/Escrowflow";

#[derive(Parser, Debug)]
#[command(
    name = "escrowflow",
    version,
    about = "Escrow tracking backend for the Escrowflow Telegram bot"
)]
pub struct Cli {
    /// Log output format
    #[arg(long, global = true, env = "ESCROWFLOW_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API and bot webhook
    Serve(ServeArgs),
    /// Print a signed init-data payload for local testing
    SignHandoff(SignHandoffArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address; overrides PORT
    #[arg(long, env = "ESCROWFLOW_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Port to bind on 0.0.0.0 when no listen address is given
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// URL opened by the bot's web-app button
    #[arg(long, env = "ESCROWFLOW_WEBAPP_URL", default_value = DEFAULT_WEBAPP_URL)]
    pub webapp_url: String,

    /// Expected X-Telegram-Bot-Api-Secret-Token on webhook calls
    #[arg(long, env = "ESCROWFLOW_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Request body limit in KiB
    #[arg(long, env = "ESCROWFLOW_BODY_LIMIT_KB", default_value_t = 64)]
    pub body_limit_kb: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "ESCROWFLOW_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct SignHandoffArgs {
    /// Telegram user id to embed
    #[arg(long)]
    pub user_id: i64,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    /// Unix timestamp; defaults to now
    #[arg(long)]
    pub auth_date: Option<i64>,

    /// Extra signed fields as key=value
    #[arg(long = "field", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if k.is_empty() {
        return Err("field key must not be empty".to_string());
    }
    Ok((k.to_string(), v.to_string()))
}
