use std::borrow::Borrow;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex chars in an escrow id (64 bits).
pub const ESCROW_ID_LEN: usize = 16;

/// Opaque escrow identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscrowId(String);

impl EscrowId {
    /// `sha256(owner || amount || 16 random bytes)`, truncated to 64 bits.
    pub(crate) fn generate(owner_id: &str, amount: f64) -> Self {
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(owner_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(amount.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(nonce);
        let digest = hasher.finalize();

        Self(hex::encode(&digest[..ESCROW_ID_LEN / 2]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EscrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EscrowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EscrowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
