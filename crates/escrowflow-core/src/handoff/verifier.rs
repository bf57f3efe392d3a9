use std::fmt;
use std::time::Duration;

use crate::config::VerifierConfig;
use crate::error::{VerifyError, VerifyResult};

use super::claims::Claims;
use super::payload::parse_payload;
use super::signature::{build_check_string, derive_secret_key, verify_hash};

/// Verifies hand-off payloads against one bot token.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct HandoffVerifier {
    secret_key: [u8; 32],
    max_age: Duration,
    clock_skew_leeway: Duration,
}

impl fmt::Debug for HandoffVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffVerifier")
            .field("secret_key", &"***")
            .field("max_age", &self.max_age)
            .field("clock_skew_leeway", &self.clock_skew_leeway)
            .finish()
    }
}

impl HandoffVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            secret_key: derive_secret_key(&config.bot_token),
            max_age: config.max_age,
            clock_skew_leeway: config.clock_skew_leeway,
        }
    }

    /// Verify against the system clock.
    pub fn verify(&self, raw: &str) -> VerifyResult<Claims> {
        self.verify_at(raw, chrono::Utc::now().timestamp())
    }

    /// Verify a payload, treating `now` (unix seconds) as the current time.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse unique `key=value` pairs and take out `hash`
    /// 2. Recompute the HMAC over the sorted check string, compare in constant time
    /// 3. Check `auth_date` against the freshness window
    /// 4. Decode the `user` claims
    pub fn verify_at(&self, raw: &str, now: i64) -> VerifyResult<Claims> {
        let payload = parse_payload(raw)?;

        let check_string = build_check_string(payload.fields());
        verify_hash(&self.secret_key, &check_string, payload.hash())?;

        let auth_date = payload
            .get("auth_date")
            .ok_or_else(|| VerifyError::failed("missing auth_date"))?
            .parse::<i64>()
            .map_err(|_| VerifyError::failed("auth_date is not an integer"))?;
        self.check_freshness(auth_date, now)?;

        let user = payload
            .get("user")
            .ok_or_else(|| VerifyError::failed("missing user"))?;
        let claims = Claims::from_user_json(user, auth_date)
            .map_err(|e| VerifyError::failed(format!("invalid user json: {e}")))?;

        tracing::debug!(
            user_id = %claims.user_id,
            auth_date,
            fields = payload.fields().len(),
            "handoff verified"
        );
        Ok(claims)
    }

    fn check_freshness(&self, auth_date: i64, now: i64) -> VerifyResult<()> {
        if self.max_age.is_zero() {
            return Ok(());
        }
        let age = now.saturating_sub(auth_date);
        let max_age = self.max_age.as_secs();
        let too_old = age > 0 && age.unsigned_abs() > max_age;
        let from_future = age < 0 && age.unsigned_abs() > self.clock_skew_leeway.as_secs();
        if too_old || from_future {
            return Err(VerifyError::StaleTimestamp {
                age_secs: age,
                max_age_secs: max_age,
            });
        }
        Ok(())
    }
}
