//! Account endpoints for the authenticated caller.

use axum::{Extension, Json};
use warden_core::models::auth::Account;

use crate::middleware::auth::CurrentAccount;

/// `GET /user/me`: the account behind the bearer token, as currently stored.
pub async fn me_handler(
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Json<Account> {
    Json(account)
}
