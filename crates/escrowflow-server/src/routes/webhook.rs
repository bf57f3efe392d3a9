use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};

use crate::app::AppState;
use crate::auth::constant_time_eq;
use crate::bot::types::Update;
use crate::error::ApiError;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// `POST /bot/webhook`: one update in, at most one Bot API call out.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Update>, JsonRejection>,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let supplied = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !constant_time_eq(supplied, expected) {
            tracing::warn!(target: "escrowflow::bot", reason = "E_WEBHOOK_SECRET", "webhook rejected");
            return Err(ApiError::Unauthorized);
        }
    }

    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let reply = state.bot.handle(&update);
    tracing::debug!(update_id = update.update_id, replied = reply.is_some(), "update handled");

    Ok(match reply {
        Some(msg) => Json(msg).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    })
}
