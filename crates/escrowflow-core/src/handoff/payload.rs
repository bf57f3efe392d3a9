use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::{VerifyError, VerifyResult};

/// Name of the signature field.
pub const HASH_FIELD: &str = "hash";

/// A parsed, not yet verified, hand-off payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffPayload {
    /// Signed fields. `BTreeMap` keeps them in byte-wise key order.
    fields: BTreeMap<String, String>,
    hash: String,
}

impl HandoffPayload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Split a raw payload into decoded, unique fields and the supplied hash.
pub fn parse_payload(raw: &str) -> VerifyResult<HandoffPayload> {
    if raw.is_empty() {
        return Err(VerifyError::malformed("empty payload"));
    }

    let mut fields = BTreeMap::new();
    let mut hash = None;

    for (index, pair) in raw.split('&').enumerate() {
        let (key, value) = decode_pair(pair)
            .ok_or_else(|| VerifyError::malformed(format!("pair {index} is not key=value")))?;

        if key.is_empty() {
            return Err(VerifyError::malformed(format!("pair {index} has an empty key")));
        }

        let duplicate = if key == HASH_FIELD {
            hash.replace(value).is_some()
        } else {
            fields.insert(key.clone(), value).is_some()
        };
        if duplicate {
            return Err(VerifyError::malformed(format!("duplicate key '{key}'")));
        }
    }

    let hash = hash.ok_or(VerifyError::MissingHashField)?;
    Ok(HandoffPayload { fields, hash })
}

/// Decode one `key=value` pair. Anything but exactly one `=` is rejected.
fn decode_pair(pair: &str) -> Option<(String, String)> {
    if pair.bytes().filter(|b| *b == b'=').count() != 1 {
        return None;
    }
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
}
