//! Verification of the signed hand-off payload ("init data") a Telegram
//! web view passes to the backend.
//!
//! The payload is a query string. Every field except `hash` is signed:
//!
//! ```text
//! secret_key = HMAC-SHA256(key = "WebAppData", msg = bot_token)
//! hash       = hex(HMAC-SHA256(key = secret_key, msg = check_string))
//! ```
//!
//! where `check_string` is the `key=value` pairs sorted by key and joined
//! with `\n`.

mod claims;
mod payload;
mod signature;
mod verifier;

pub use claims::{Claims, WebAppUser};
pub use payload::{parse_payload, HandoffPayload, HASH_FIELD};
pub use signature::{build_check_string, derive_secret_key, sign_handoff, WEB_APP_DATA_KEY};
pub use verifier::HandoffVerifier;
