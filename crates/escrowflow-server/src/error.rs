use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use escrowflow_core::{StoreError, VerifyError};

/// Body text for every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication failed";

#[derive(Debug)]
pub enum ApiError {
    /// Reason is logged where the error is raised, never returned.
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string()),
            ApiError::BadRequest(s) => (StatusCode::BAD_REQUEST, s),
            ApiError::NotFound(s) => (StatusCode::NOT_FOUND, s),
            ApiError::Conflict(s) => (StatusCode::CONFLICT, s),
            ApiError::Internal(e) => {
                tracing::error!(target: "escrowflow::http", "internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (
            status,
            Json(serde_json::json!({ "status": "error", "message": message })),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidAmount { .. } | StoreError::InvalidOwner => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::NotFound { .. } => ApiError::NotFound("Escrow not found".to_string()),
            StoreError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        tracing::warn!(
            target: "escrowflow::auth",
            reason = err.code(),
            error = %err,
            "handoff rejected"
        );
        ApiError::Unauthorized
    }
}
