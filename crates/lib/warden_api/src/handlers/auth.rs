//! Authentication request handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use tracing::debug;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::CurrentAccount;
use crate::models::{LoginRequest, StatusResponse, TokenResponse};
use crate::services::auth;

/// `POST /auth/login`: authenticate with username + password.
///
/// An unreadable body is a 400 with the usual error envelope.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(body) = body?;
    let resp = auth::login(&state, &body.username, &body.password).await?;
    Ok(Json(resp))
}

/// `POST /auth/verify`: succeeds when the bearer token resolves to an account.
///
/// The token itself is checked by the auth middleware in front of this route.
pub async fn verify_handler(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<StatusResponse> {
    debug!(account_id = account.id, "token verified");
    Json(StatusResponse {
        status: "valid".to_string(),
    })
}
