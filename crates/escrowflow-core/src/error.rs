//! Error types for hand-off verification and the escrow store.

use crate::store::EscrowStatus;

/// Hand-off verification errors.
///
/// The variants exist for diagnostics. Callers facing an untrusted client
/// must collapse all of them into a single "unauthorized" outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Payload could not be split into unique `key=value` pairs.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// Payload carries no `hash` field.
    #[error("payload has no hash field")]
    MissingHashField,

    /// Signature mismatch, or the signed claims could not be decoded.
    #[error("verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// `auth_date` is outside the freshness window.
    #[error("stale auth_date: age {age_secs}s exceeds window of {max_age_secs}s")]
    StaleTimestamp { age_secs: i64, max_age_secs: u64 },
}

impl VerifyError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self::VerificationFailed {
            reason: reason.into(),
        }
    }

    /// Stable code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "E_HANDOFF_MALFORMED",
            Self::MissingHashField => "E_HANDOFF_NO_HASH",
            Self::VerificationFailed { .. } => "E_HANDOFF_SIGNATURE",
            Self::StaleTimestamp { .. } => "E_HANDOFF_STALE",
        }
    }
}

/// Escrow store errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Amount is not a finite positive number.
    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    /// Owner id is empty or padded with whitespace.
    #[error("invalid owner: owner id must be non-empty with no surrounding whitespace")]
    InvalidOwner,

    /// No record under this id.
    #[error("escrow not found: {id}")]
    NotFound { id: String },

    /// Status change would move backwards or leave a terminal state.
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: EscrowStatus,
        to: EscrowStatus,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing bot token: set ESCROWFLOW_BOT_TOKEN or TELEGRAM_BOT_TOKEN")]
    MissingToken,

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Result type for verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
