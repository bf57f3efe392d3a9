//! HTTP API and bot webhook for Escrowflow.
//!
//! Every escrow endpoint verifies the Telegram hand-off payload carried in
//! `Authorization: tma <initData>` before it touches the store. Verification
//! failures of any kind answer `401` with one fixed body.

pub mod amount;
pub mod app;
pub mod auth;
pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod server;

pub use app::{build_router, AppState};
pub use config::ServerConfig;
pub use error::ApiError;
