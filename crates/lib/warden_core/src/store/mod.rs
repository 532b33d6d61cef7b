//! Credential store: repositories over account and credential records.
//!
//! [`Repository`] is the shared CRUD surface, implemented once per record type
//! by each backend. [`CredentialStore`] bundles the account and credential
//! repositories so callers can hold a single `Arc<dyn CredentialStore>`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::auth::{Account, Credential, NewAccount, NewCredential};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Column width of `account.username`, in characters.
pub const USERNAME_MAX_LEN: usize = 20;

/// Column width of `account.email`, in characters.
pub const EMAIL_MAX_LEN: usize = 100;

/// Check a new account against the column widths of the `account` table.
pub fn check_new_account(new: &NewAccount) -> Result<(), StoreError> {
    for (column, value, max) in [
        ("username", &new.username, USERNAME_MAX_LEN),
        ("email", &new.email, EMAIL_MAX_LEN),
    ] {
        let len = value.chars().count();
        if len > max {
            return Err(StoreError::Invalid(format!(
                "{column} is {len} characters, at most {max} allowed"
            )));
        }
    }
    Ok(())
}

/// A window into a listing ordered by identity.
///
/// Negative offsets and limits are clamped to zero on construction, so every
/// backend sees the same non-negative values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    skip: i64,
    limit: Option<i64>,
}

impl Page {
    /// Skip `skip` records, then return at most `limit` (all remaining on `None`).
    pub fn new(skip: i64, limit: Option<i64>) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.map(|l| l.max(0)),
        }
    }

    /// The whole listing.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }
}

/// Equality filters for account listings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub is_active: Option<bool>,
    pub email: Option<String>,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        self.is_active.is_none_or(|active| account.is_active == active)
            && self.email.as_deref().is_none_or(|email| account.email == email)
    }
}

/// A persisted record with an identity field.
pub trait Record: Clone + Send + Sync + 'static {
    /// Identity type.
    type Id: Copy + Send + Sync + 'static;
    /// Insertable form; the store fills in identity and timestamps.
    type New: Send + 'static;

    fn id(&self) -> Self::Id;
}

impl Record for Account {
    type Id = i64;
    type New = NewAccount;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Credential {
    type Id = i64;
    type New = NewCredential;

    fn id(&self) -> i64 {
        self.id
    }
}

/// CRUD operations shared by every record type.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Fetch a record by identity.
    async fn get_by_id(&self, id: R::Id) -> Result<Option<R>, StoreError>;

    /// Insert a record, returning it as stored.
    async fn insert(&self, new: R::New) -> Result<R, StoreError>;

    /// Page through records in identity order.
    async fn list(&self, page: Page) -> Result<Vec<R>, StoreError>;
}

/// Account lookups beyond plain CRUD.
#[async_trait]
pub trait AccountRepository: Repository<Account> {
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Page through the accounts matching `filter`, in identity order.
    async fn list_filtered(
        &self,
        filter: &AccountFilter,
        page: Page,
    ) -> Result<Vec<Account>, StoreError>;

    /// Set the account's last-login timestamp.
    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Credential lookups beyond plain CRUD.
#[async_trait]
pub trait CredentialRepository: Repository<Credential> {
    /// The newest credential of an account, which is the one checked at login.
    async fn current_for_account(&self, account_id: i64)
    -> Result<Option<Credential>, StoreError>;
}

/// Everything the authentication flows need from persistence.
pub trait CredentialStore: AccountRepository + CredentialRepository {}

impl<T: AccountRepository + CredentialRepository> CredentialStore for T {}
