//! Authentication domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record for a user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Insertable form of [`Account`]; the store assigns id and creation time.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

impl NewAccount {
    /// An active account with the given username and email.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            is_active: true,
        }
    }
}

/// Password material for one [`Account`].
///
/// Never serialized: hashes stay inside the store and the password verifier.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Credential {
    pub id: i64,
    pub account_id: i64,
    /// bcrypt hash compared at login. A `None` hash never authenticates.
    pub password_hash: Option<String>,
    /// Hash replaced by the last password change. Not consulted by login.
    pub previous_hash: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable form of [`Credential`].
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub account_id: i64,
    pub password_hash: String,
    pub previous_hash: Option<String>,
}

impl NewCredential {
    /// A credential with no password history.
    pub fn new(account_id: i64, password_hash: impl Into<String>) -> Self {
        Self {
            account_id,
            password_hash: password_hash.into(),
            previous_hash: None,
        }
    }
}

/// Claims embedded in session tokens.
///
/// A snapshot of the account at issue time; it is never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub last_login: Option<DateTime<Utc>>,
    /// Absolute expiry, epoch seconds.
    pub token_expires: f64,
}
