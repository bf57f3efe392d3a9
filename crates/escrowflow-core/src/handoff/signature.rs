use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use crate::config::BotToken;
use crate::error::{VerifyError, VerifyResult};

use super::payload::HASH_FIELD;

type HmacSha256 = Hmac<Sha256>;

/// HMAC key used to derive the per-bot secret. The bot token is the message.
pub const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

/// Derive the signing key for a bot token.
pub fn derive_secret_key(token: &BotToken) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(WEB_APP_DATA_KEY).expect("HMAC can take key of any size");
    mac.update(token.expose());
    let mut key = [0u8; 32];
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}

/// Render signed fields as the newline-joined check string.
pub fn build_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mac_for(secret_key: &[u8; 32], check_string: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret_key).expect("HMAC can take key of any size");
    mac.update(check_string.as_bytes());
    mac
}

/// Check a supplied hex hash against the check string in constant time.
pub(crate) fn verify_hash(
    secret_key: &[u8; 32],
    check_string: &str,
    supplied: &str,
) -> VerifyResult<()> {
    // Shape check only looks at public input.
    if supplied.len() != 64 || !supplied.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(VerifyError::failed("hash is not 64 lowercase hex chars"));
    }
    let supplied = hex::decode(supplied).map_err(|e| VerifyError::failed(e.to_string()))?;

    mac_for(secret_key, check_string)
        .verify_slice(&supplied)
        .map_err(|_| VerifyError::failed("signature mismatch"))
}

/// Produce a signed payload from `fields`, keeping their order.
///
/// Counterpart of verification, for tests and local tooling.
pub fn sign_handoff<'a, I>(fields: I, token: &BotToken) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let fields: Vec<(&str, &str)> = fields
        .into_iter()
        .filter(|(k, _)| *k != HASH_FIELD)
        .collect();

    let sorted: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let check_string = build_check_string(&sorted);
    let hash = hex::encode(
        mac_for(&derive_secret_key(token), &check_string)
            .finalize()
            .into_bytes(),
    );

    let mut out = form_urlencoded::Serializer::new(String::new());
    out.extend_pairs(fields);
    out.append_pair(HASH_FIELD, &hash);
    out.finish()
}
