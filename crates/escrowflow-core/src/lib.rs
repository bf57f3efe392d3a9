//! Hand-off verification and escrow records for Escrowflow.
//!
//! This crate holds everything the HTTP layer and the bot trust:
//!
//! - Verification of Telegram web-app init data (the signed hand-off payload)
//! - An in-memory escrow record store with forward-only status
//! - A directory of the last verified profile per user
//!
//! # Quick Start
//!
//! ```no_run
//! use escrowflow_core::{EscrowStore, HandoffVerifier, VerifierConfig};
//!
//! # fn example(init_data: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = HandoffVerifier::new(VerifierConfig::from_env()?);
//! let claims = verifier.verify(init_data)?;
//!
//! let store = EscrowStore::new();
//! let id = store.create(&claims.user_id, 100.0)?;
//! assert!(store.get(id.as_str()).is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ESCROWFLOW_BOT_TOKEN` | Bot API token used as the verification secret |
//! | `TELEGRAM_BOT_TOKEN` | Fallback for `ESCROWFLOW_BOT_TOKEN` |
//! | `ESCROWFLOW_AUTH_MAX_AGE_SECS` | Freshness window for `auth_date` (default: 86400, 0 disables) |
//! | `ESCROWFLOW_AUTH_LEEWAY_SECS` | Allowed clock skew for future `auth_date` (default: 30) |

pub mod config;
pub mod error;
pub mod handoff;
pub mod store;
pub mod users;

pub use config::{BotToken, VerifierConfig};
pub use error::{ConfigError, StoreError, StoreResult, VerifyError, VerifyResult};
pub use handoff::{
    build_check_string, derive_secret_key, parse_payload, sign_handoff, Claims, HandoffPayload,
    HandoffVerifier, WebAppUser, HASH_FIELD, WEB_APP_DATA_KEY,
};
pub use store::{EscrowId, EscrowRecord, EscrowStatus, EscrowStore};
pub use users::{DirectoryEntry, UserDirectory};
