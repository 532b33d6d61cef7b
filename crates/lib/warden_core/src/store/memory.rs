//! In-memory credential store.
//!
//! Backs tests and local runs without PostgreSQL. Enforces the constraints of
//! the SQL schema: column widths and uniqueness of username and email, and
//! credentials must reference an existing account.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{
    AccountFilter, AccountRepository, CredentialRepository, Page, Repository, StoreError,
    check_new_account,
};
use crate::models::auth::{Account, Credential, NewAccount, NewCredential};

/// Concurrent in-memory store with identity sequences starting at 1.
#[derive(Debug)]
pub struct MemoryStore {
    accounts: DashMap<i64, Account>,
    credentials: DashMap<i64, Credential>,
    next_account_id: AtomicI64,
    next_credential_id: AtomicI64,
    /// Serializes account inserts so uniqueness checks and writes are atomic.
    account_write: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            credentials: DashMap::new(),
            next_account_id: AtomicI64::new(1),
            next_credential_id: AtomicI64::new(1),
            account_write: Mutex::new(()),
        }
    }

    /// Remove an account and its credentials, as an out-of-band deletion would.
    pub fn delete_account(&self, account_id: i64) -> bool {
        self.credentials
            .retain(|_, credential| credential.account_id != account_id);
        self.accounts.remove(&account_id).is_some()
    }

    fn page<R: Clone>(map: &DashMap<i64, R>, page: Page, keep: impl Fn(&R) -> bool) -> Vec<R> {
        let mut rows: Vec<(i64, R)> = map
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let take = page
            .limit()
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        rows.into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, row)| row)
            .collect()
    }
}

#[async_trait]
impl Repository<Account> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        check_new_account(&new)?;
        let _guard = self
            .account_write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for entry in self.accounts.iter() {
            if entry.username == new.username {
                return Err(StoreError::Conflict(format!(
                    "username '{}' already exists",
                    new.username
                )));
            }
            if entry.email == new.email {
                return Err(StoreError::Conflict(format!(
                    "email '{}' already exists",
                    new.email
                )));
            }
        }

        let id = self.next_account_id.fetch_add(1, Ordering::SeqCst);
        let account = Account {
            id,
            username: new.username,
            email: new.email,
            created_at: Utc::now(),
            last_login: None,
            is_active: new.is_active,
        };
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn list(&self, page: Page) -> Result<Vec<Account>, StoreError> {
        Ok(Self::page(&self.accounts, page, |_| true))
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn list_filtered(
        &self,
        filter: &AccountFilter,
        page: Page,
    ) -> Result<Vec<Account>, StoreError> {
        Ok(Self::page(&self.accounts, page, |account| filter.matches(account)))
    }

    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(mut account) = self.accounts.get_mut(&account_id) {
            account.last_login = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Credential> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError> {
        if !self.accounts.contains_key(&new.account_id) {
            return Err(StoreError::MissingReference(format!(
                "account {} does not exist",
                new.account_id
            )));
        }

        let id = self.next_credential_id.fetch_add(1, Ordering::SeqCst);
        let credential = Credential {
            id,
            account_id: new.account_id,
            password_hash: Some(new.password_hash),
            previous_hash: new.previous_hash,
            updated_at: None,
            created_at: Utc::now(),
        };
        self.credentials.insert(id, credential.clone());
        Ok(credential)
    }

    async fn list(&self, page: Page) -> Result<Vec<Credential>, StoreError> {
        Ok(Self::page(&self.credentials, page, |_| true))
    }
}

#[async_trait]
impl CredentialRepository for MemoryStore {
    async fn current_for_account(
        &self,
        account_id: i64,
    ) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .credentials
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .max_by_key(|entry| entry.id)
            .map(|entry| entry.value().clone()))
    }
}
