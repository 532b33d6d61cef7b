//! # warden_core
//!
//! Core authentication logic for Warden: account and credential records,
//! password verification, bearer token issuance and session resolution.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
