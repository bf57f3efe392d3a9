use std::net::SocketAddr;

use anyhow::Context;

use crate::app::{build_router, AppState};
use crate::config::ServerConfig;

/// Serve until ctrl-c, then drain in-flight requests.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    if !config.verifier.freshness_enabled() {
        tracing::warn!("auth_date freshness check disabled; signed payloads never expire");
    }
    if config.webhook_secret.is_none() {
        tracing::warn!("no webhook secret configured; /bot/webhook accepts any caller");
    }

    let state = AppState::new(&config);
    let app = build_router(state, config.body_limit_bytes, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(target: "escrowflow::http", %addr, "escrowflow listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!(target: "escrowflow::http", "shutting down gracefully");
        })
        .await
        .context("server error")
}
