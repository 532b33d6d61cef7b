//! Password hashing and login verification via bcrypt.

use std::sync::Arc;

use tracing::{debug, warn};

use super::AuthError;
use crate::models::auth::Account;
use crate::store::CredentialStore;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
///
/// Passwords longer than bcrypt's input limit (71 bytes) are refused rather
/// than silently truncated.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::non_truncating_hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash. Over-long passwords are an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::non_truncating_verify(password, hash)
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Checks username/password pairs against the credential store.
///
/// Every failure mode (unknown user, inactive account, no credential, wrong
/// password, unreadable hash) looks the same to the caller. Only store
/// failures come back as errors.
pub struct PasswordVerifier<S: CredentialStore + ?Sized> {
    store: Arc<S>,
}

impl<S: CredentialStore + ?Sized> PasswordVerifier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the account when `password` matches its current credential.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AuthError> {
        let Some(account) = self.store.get_by_username(username).await? else {
            debug!(username, "login rejected: unknown username");
            return Ok(None);
        };
        if !account.is_active {
            debug!(account_id = account.id, "login rejected: account inactive");
            return Ok(None);
        }

        let hash = self
            .store
            .current_for_account(account.id)
            .await?
            .and_then(|credential| credential.password_hash);
        let Some(hash) = hash else {
            debug!(account_id = account.id, "login rejected: no password credential");
            return Ok(None);
        };

        match verify_password(password, &hash) {
            Ok(true) => Ok(Some(account)),
            Ok(false) => {
                debug!(account_id = account.id, "login rejected: password mismatch");
                Ok(None)
            }
            Err(e) => {
                warn!(account_id = account.id, "login rejected: {e}");
                Ok(None)
            }
        }
    }

    /// Whether `password` is the current password of `username`.
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        Ok(self.authenticate(username, password).await?.is_some())
    }
}
