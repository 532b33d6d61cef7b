//! PostgreSQL credential store.
//!
//! Each operation acquires its own pooled connection; the guard hands it back
//! to the pool when it drops, on success and error paths alike.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{
    AccountFilter, AccountRepository, CredentialRepository, Page, Repository, StoreError,
    check_new_account,
};
use crate::models::auth::{Account, Credential, NewAccount, NewCredential};

const ACCOUNT_COLUMNS: &str = "id, username, email, created_at, last_login, is_active";
const CREDENTIAL_COLUMNS: &str =
    "id, account_id, password_hash, previous_hash, updated_at, created_at";

/// Credential store backed by a PostgreSQL pool.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into store-level errors.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return StoreError::MissingReference(db.message().to_string());
        }
    }
    StoreError::Sql(e)
}

#[async_trait]
impl Repository<Account> for PgStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        check_new_account(&new)?;
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO account (username, email, is_active) VALUES ($1, $2, $3) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(new.is_active)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_insert_error)
    }

    async fn list(&self, page: Page) -> Result<Vec<Account>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        // LIMIT NULL is LIMIT ALL in PostgreSQL.
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    async fn list_filtered(
        &self,
        filter: &AccountFilter,
        page: Page,
    ) -> Result<Vec<Account>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account \
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1) \
               AND ($2::TEXT IS NULL OR email = $2) \
             ORDER BY id OFFSET $3 LIMIT $4"
        ))
        .bind(filter.is_active)
        .bind(filter.email.as_deref())
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("UPDATE account SET last_login = $2 WHERE id = $1")
            .bind(account_id)
            .bind(at)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<Credential> for PgStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credential WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Credential>(&format!(
            "INSERT INTO credential (account_id, password_hash, previous_hash) \
             VALUES ($1, $2, $3) RETURNING {CREDENTIAL_COLUMNS}"
        ))
        .bind(new.account_id)
        .bind(&new.password_hash)
        .bind(&new.previous_hash)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_insert_error)
    }

    async fn list(&self, page: Page) -> Result<Vec<Credential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credential ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl CredentialRepository for PgStore {
    async fn current_for_account(
        &self,
        account_id: i64,
    ) -> Result<Option<Credential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credential WHERE account_id = $1 \
             ORDER BY id DESC LIMIT 1"
        ))
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }
}
