use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use escrowflow_core::VerifierConfig;

use crate::cli::ServeArgs;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub verifier: VerifierConfig,
    pub webapp_url: String,
    pub webhook_secret: Option<String>,
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Defaults for everything but the verification secret.
    pub fn new(verifier: VerifierConfig) -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            verifier,
            webapp_url: crate::cli::DEFAULT_WEBAPP_URL.to_string(),
            webhook_secret: None,
            body_limit_bytes: 64 * 1024,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Combine CLI/env arguments with the verifier settings from the environment.
    pub fn from_args(args: &ServeArgs) -> anyhow::Result<Self> {
        let verifier = VerifierConfig::from_env().context("failed to load verifier config")?;
        Self::from_parts(args, verifier)
    }

    pub fn from_parts(args: &ServeArgs, verifier: VerifierConfig) -> anyhow::Result<Self> {
        if args.body_limit_kb == 0 {
            anyhow::bail!("body limit must be at least 1 KiB");
        }
        if args.request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least 1 second");
        }

        let listen = match (args.listen, args.port) {
            (Some(addr), _) => addr,
            (None, Some(port)) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            (None, None) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        };

        let webhook_secret = args
            .webhook_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Self {
            listen,
            verifier,
            webapp_url: args.webapp_url.clone(),
            webhook_secret,
            body_limit_bytes: args.body_limit_kb * 1024,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }
}
