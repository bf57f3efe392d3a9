use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "ESCROWFLOW_BOT_TOKEN";
pub const TOKEN_ENV_FALLBACK: &str = "TELEGRAM_BOT_TOKEN";
pub const MAX_AGE_ENV: &str = "ESCROWFLOW_AUTH_MAX_AGE_SECS";
pub const LEEWAY_ENV: &str = "ESCROWFLOW_AUTH_LEEWAY_SECS";

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_LEEWAY: Duration = Duration::from_secs(30);

/// The bot API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub bot_token: BotToken,
    /// Maximum age of `auth_date`. Zero disables the check.
    pub max_age: Duration,
    /// How far in the future `auth_date` may be.
    pub clock_skew_leeway: Duration,
}

impl VerifierConfig {
    pub fn new(bot_token: BotToken) -> Self {
        Self {
            bot_token,
            max_age: DEFAULT_MAX_AGE,
            clock_skew_leeway: DEFAULT_LEEWAY,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.clock_skew_leeway = leeway;
        self
    }

    pub fn freshness_enabled(&self) -> bool {
        !self.max_age.is_zero()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let token = [TOKEN_ENV, TOKEN_ENV_FALLBACK]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let mut cfg = Self::new(BotToken::new(token));

        if let Some(secs) = secs_from_env(MAX_AGE_ENV)? {
            cfg.max_age = secs;
        }
        if let Some(secs) = secs_from_env(LEEWAY_ENV)? {
            cfg.clock_skew_leeway = secs;
        }

        Ok(cfg)
    }
}

fn secs_from_env(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(var) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map(|s| Some(Duration::from_secs(s)))
            .map_err(|_| ConfigError::InvalidValue { var, value: v }),
        Err(_) => Ok(None),
    }
}
