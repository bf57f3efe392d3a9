use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use escrowflow_core::{BotToken, EscrowStatus, VerifierConfig};
use escrowflow_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "hook-secret-123";

fn state(secret: Option<&str>) -> AppState {
    let mut config = ServerConfig::new(VerifierConfig::new(BotToken::new("1:token")));
    config.webhook_secret = secret.map(String::from);
    config.webapp_url = "https://example.test/webapp".to_string();
    AppState::new(&config)
}

fn app(state: &AppState) -> Router {
    build_router(state.clone(), 64 * 1024, Duration::from_secs(5))
}

fn webhook(update: Value, secret: Option<&str>) -> Request<Body> {
    let mut req = Request::post("/bot/webhook").header(header::CONTENT_TYPE, "application/json");
    if let Some(s) = secret {
        req = req.header("X-Telegram-Bot-Api-Secret-Token", s);
    }
    req.body(Body::from(update.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn start_update() -> Value {
    json!({
        "update_id": 100,
        "message": {
            "message_id": 1,
            "from": { "id": 314, "first_name": "Pi" },
            "chat": { "id": 314 },
            "text": "/start"
        }
    })
}

#[tokio::test]
async fn test_start_command_replies_with_send_message() {
    let state = state(Some(SECRET));
    let (status, body) = send(&app(&state), webhook(start_update(), Some(SECRET))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "sendMessage");
    assert_eq!(body["chat_id"], 314);
    assert_eq!(
        body["reply_markup"]["inline_keyboard"][0][0]["web_app"]["url"],
        "https://example.test/webapp"
    );
}

#[tokio::test]
async fn test_secret_is_enforced_when_configured() {
    let state = state(Some(SECRET));
    let app = app(&state);

    let (status, _) = send(&app, webhook(start_update(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, webhook(start_update(), Some("hook-secret-124"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_no_secret_configured_accepts_updates() {
    let state = state(None);
    let (status, body) = send(&app(&state), webhook(start_update(), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "sendMessage");
}

#[tokio::test]
async fn test_web_app_data_creates_escrow_for_sender() {
    let state = state(Some(SECRET));
    let data = json!({
        "action": "create_escrow",
        "data": { "title": "Bike", "amount": 80, "currency": "EUR" }
    })
    .to_string();
    let update = json!({
        "update_id": 101,
        "message": {
            "message_id": 2,
            "from": { "id": 2718, "first_name": "Euler" },
            "chat": { "id": 2718 },
            "web_app_data": { "data": data, "button_text": "Create" }
        }
    });

    let (status, body) = send(&app(&state), webhook(update, Some(SECRET))).await;
    assert_eq!(status, StatusCode::OK);

    let records = state.escrows.list_by_owner("2718");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, 80.0);
    assert_eq!(records[0].status, EscrowStatus::Pending);
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains(records[0].escrow_id.as_str()));
}

#[tokio::test]
async fn test_unhandled_update_answers_empty_object() {
    let state = state(None);
    let (status, body) = send(&app(&state), webhook(json!({ "update_id": 5 }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_malformed_update_is_bad_request() {
    let state = state(None);
    let (status, _) = send(&app(&state), webhook(json!({ "message": "nope" }), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
