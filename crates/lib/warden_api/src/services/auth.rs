//! Authentication service: the login flow on top of `warden_core::auth`.

use chrono::Utc;
use tracing::info;
use warden_core::auth::AuthError;
use warden_core::store::AccountRepository;

use crate::AppState;
use crate::error::AppResult;
use crate::models::TokenResponse;

/// Token type reported to clients.
pub const TOKEN_TYPE: &str = "bearer";

/// Authenticate with username + password and issue a session token.
///
/// The token carries the account's previous last-login; the stored value is
/// moved to now once the token has been issued. If that update fails the
/// login fails with it and the issued token is discarded, so no token reaches
/// a client without its login being recorded.
pub async fn login(state: &AppState, username: &str, password: &str) -> AppResult<TokenResponse> {
    let account = state
        .verifier
        .authenticate(username, password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.codec.issue(&account)?;

    state
        .store
        .record_login(account.id, Utc::now())
        .await?;
    info!(account_id = account.id, "login succeeded");

    Ok(TokenResponse {
        token,
        token_type: TOKEN_TYPE.to_string(),
    })
}
