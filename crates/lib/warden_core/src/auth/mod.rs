//! Authentication: password verification, session tokens and session resolution.
//!
//! Shared by the HTTP layer in `warden_api`; nothing here knows about HTTP.

pub mod jwt;
pub mod password;
pub mod session;

use thiserror::Error;

use crate::store::StoreError;

pub use jwt::TokenCodec;
pub use password::PasswordVerifier;
pub use session::SessionResolver;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token claim: {0}")]
    MalformedClaim(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
