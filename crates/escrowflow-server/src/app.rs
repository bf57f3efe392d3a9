use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use escrowflow_core::{EscrowStore, HandoffVerifier, UserDirectory};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::bot::BotHandler;
use crate::config::ServerConfig;
use crate::routes;

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<HandoffVerifier>,
    pub escrows: EscrowStore,
    pub users: UserDirectory,
    pub bot: Arc<BotHandler>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let escrows = EscrowStore::new();
        Self {
            verifier: Arc::new(HandoffVerifier::new(config.verifier.clone())),
            bot: Arc::new(BotHandler::new(escrows.clone(), config.webapp_url.clone())),
            escrows,
            users: UserDirectory::new(),
            webhook_secret: config.webhook_secret.as_deref().map(Arc::from),
        }
    }
}

async fn map_middleware_error(err: BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(serde_json::json!({ "status": "error", "message": "request timed out" })),
        )
    } else {
        tracing::error!(target: "escrowflow::http", error = %err, "middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "error", "message": "Internal server error" })),
        )
    }
}

pub fn build_router(state: AppState, body_limit_bytes: usize, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/auth", post(routes::auth::authenticate))
        .route("/api/init", post(routes::escrow::create))
        .route("/api/escrows", get(routes::escrow::list))
        .route("/api/escrow/:id", get(routes::escrow::get))
        .route("/bot/webhook", post(routes::webhook::receive))
        .with_state(state)
        // `HandleErrorLayer` turns the timeout error into a response.
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(map_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
