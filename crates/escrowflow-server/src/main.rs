use clap::Parser;
use escrowflow_core::{sign_handoff, BotToken, VerifierConfig};
use escrowflow_server::cli::{Cli, Command, SignHandoffArgs};
use escrowflow_server::config::ServerConfig;
use escrowflow_server::logging::init_tracing;
use escrowflow_server::server;
use serde_json::json;

const RUNTIME_ERROR: i32 = 1;
const CONFIG_ERROR: i32 = 2;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let code = match cli.cmd {
        Command::Serve(args) => match ServerConfig::from_args(&args) {
            Ok(config) => match server::run(config).await {
                Ok(()) => 0,
                Err(e) => {
                    tracing::error!("fatal: {e:?}");
                    RUNTIME_ERROR
                }
            },
            Err(e) => {
                eprintln!("config error: {e:#}");
                CONFIG_ERROR
            }
        },
        Command::SignHandoff(args) => match VerifierConfig::from_env() {
            Ok(cfg) => {
                println!("{}", signed_payload(&args, &cfg.bot_token));
                0
            }
            Err(e) => {
                eprintln!("config error: {e}");
                CONFIG_ERROR
            }
        },
    };
    std::process::exit(code);
}

fn signed_payload(args: &SignHandoffArgs, token: &BotToken) -> String {
    let mut user = json!({ "id": args.user_id });
    if let Some(name) = &args.first_name {
        user["first_name"] = json!(name);
    }
    if let Some(username) = &args.username {
        user["username"] = json!(username);
    }
    let user = user.to_string();
    let auth_date = args
        .auth_date
        .unwrap_or_else(|| chrono::Utc::now().timestamp())
        .to_string();

    let mut fields = vec![("auth_date", auth_date.as_str()), ("user", user.as_str())];
    fields.extend(args.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    sign_handoff(fields, token)
}
