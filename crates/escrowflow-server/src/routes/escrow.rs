use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::amount::AmountInput;
use crate::app::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

/// Body of `POST /api/init`. Any client-sent owner id is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    amount: AmountInput,
}

/// `POST /api/init`
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let claims = authenticate(&state.verifier, &headers)?;

    let Json(req) = body.map_err(|_| ApiError::BadRequest("Missing parameters".to_string()))?;
    let amount = req
        .amount
        .to_f64()
        .ok_or_else(|| ApiError::BadRequest("amount must be a number".to_string()))?;

    let escrow_id = state.escrows.create(&claims.user_id, amount)?;
    Ok(Json(json!({ "status": "success", "escrow_id": escrow_id })))
}

/// `GET /api/escrow/:id`
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&state.verifier, &headers)?;
    let escrow = state.escrows.fetch(&id)?;
    Ok(Json(json!({ "status": "success", "escrow": escrow })))
}

/// `GET /api/escrows`: the caller's escrows.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let claims = authenticate(&state.verifier, &headers)?;
    let escrows = state.escrows.list_by_owner(&claims.user_id);
    Ok(Json(json!({ "status": "success", "escrows": escrows })))
}
