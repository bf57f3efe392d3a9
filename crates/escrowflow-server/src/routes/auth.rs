use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AuthForm {
    #[serde(rename = "initData", default)]
    init_data: Option<String>,
}

/// `POST /api/auth`: verify `initData` and record the user.
pub async fn authenticate(
    State(state): State<AppState>,
    form: Result<Form<AuthForm>, FormRejection>,
) -> Result<Json<Value>, ApiError> {
    let init_data = form
        .ok()
        .and_then(|Form(f)| f.init_data)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No initData provided".to_string()))?;

    let claims = state.verifier.verify(&init_data)?;
    let entry = state.users.upsert(&claims);
    tracing::info!(user_id = %claims.user_id, "user authenticated");

    Ok(Json(json!({
        "status": "success",
        "user": entry.user,
        "display_name": claims.display_name,
        "auth_date": claims.auth_date,
    })))
}
