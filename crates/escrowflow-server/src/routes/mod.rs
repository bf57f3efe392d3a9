pub mod auth;
pub mod escrow;
pub mod webhook;
