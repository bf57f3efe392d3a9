use axum::http::{header, HeaderMap};
use escrowflow_core::{Claims, HandoffVerifier};

use crate::error::ApiError;

/// Authorization scheme carrying raw init data.
pub const AUTH_SCHEME: &str = "tma";

/// Verify the hand-off payload from the `Authorization` header.
pub fn authenticate(verifier: &HandoffVerifier, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let Some(raw) = init_data_from_headers(headers) else {
        tracing::warn!(
            target: "escrowflow::auth",
            reason = "E_AUTH_HEADER",
            "missing or unsupported authorization header"
        );
        return Err(ApiError::Unauthorized);
    };
    Ok(verifier.verify(raw)?)
}

fn init_data_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, init_data) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(AUTH_SCHEME) {
        return None;
    }
    let init_data = init_data.trim();
    (!init_data.is_empty()).then_some(init_data)
}

/// Length-checked constant-time string comparison.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
