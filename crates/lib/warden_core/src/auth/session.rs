//! Bearer token → live account resolution.

use std::sync::Arc;

use tracing::debug;

use super::AuthError;
use super::jwt::TokenCodec;
use crate::models::auth::Account;
use crate::store::{CredentialStore, Repository};

/// The trust boundary: turns a bearer token into the account it speaks for.
///
/// Holds no state between calls. Each resolution decodes the token and
/// re-reads the account, so callers see the account as it is now rather than
/// the snapshot embedded in the token.
pub struct SessionResolver<S: CredentialStore + ?Sized> {
    codec: Arc<TokenCodec>,
    store: Arc<S>,
}

impl<S: CredentialStore + ?Sized> SessionResolver<S> {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<S>) -> Self {
        Self { codec, store }
    }

    /// Resolve `token` to its account.
    ///
    /// Token failures come back as [`AuthError::InvalidSignature`],
    /// [`AuthError::MalformedClaim`] or [`AuthError::TokenExpired`]. A valid
    /// token whose account has since been removed or deactivated yields
    /// [`AuthError::AccountNotFound`].
    pub async fn resolve(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self.codec.decode(token)?;

        let account = Repository::<Account>::get_by_id(self.store.as_ref(), claims.account_id)
            .await?
            .filter(|account| account.is_active);

        match account {
            Some(account) => Ok(account),
            None => {
                debug!(account_id = claims.account_id, "token refers to a missing account");
                Err(AuthError::AccountNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::models::auth::NewAccount;
    use crate::store::{AccountRepository, MemoryStore};
    use chrono::{Duration, Utc};
    use jsonwebtoken::Algorithm;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            &AuthConfig::new("test-secret", Algorithm::HS256, 30).unwrap(),
        ))
    }

    async fn store_with(name: &str) -> (Arc<MemoryStore>, Account) {
        let store = Arc::new(MemoryStore::new());
        let account = Repository::<Account>::insert(
            store.as_ref(),
            NewAccount::new(name, format!("{name}@example.com")),
        )
        .await
        .unwrap();
        (store, account)
    }

    #[tokio::test]
    async fn resolves_valid_token_to_account() {
        let codec = codec();
        let (store, account) = store_with("testuser").await;
        let resolver = SessionResolver::new(codec.clone(), store);

        let token = codec.issue(&account).unwrap();
        assert_eq!(account, resolver.resolve(&token).await.unwrap());
    }

    #[tokio::test]
    async fn returns_live_account_not_snapshot() {
        let codec = codec();
        let (store, account) = store_with("testuser").await;
        let token = codec.issue(&account).unwrap();

        let login_at = Utc::now();
        store.record_login(account.id, login_at).await.unwrap();

        let resolver = SessionResolver::new(codec, store);
        let resolved = resolver.resolve(&token).await.unwrap();
        assert_eq!(Some(login_at), resolved.last_login);
    }

    #[tokio::test]
    async fn deleted_account_is_not_found() {
        let codec = codec();
        let (store, account) = store_with("testuser").await;
        let token = codec.issue(&account).unwrap();
        assert!(store.delete_account(account.id));

        let resolver = SessionResolver::new(codec, store);
        let err = resolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound), "got {err:?}");
    }

    #[tokio::test]
    async fn inactive_account_is_not_found() {
        let codec = codec();
        let store = Arc::new(MemoryStore::new());
        let mut new = NewAccount::new("dormant", "dormant@example.com");
        new.is_active = false;
        let account = Repository::<Account>::insert(store.as_ref(), new)
            .await
            .unwrap();
        let token = codec.issue(&account).unwrap();

        let resolver = SessionResolver::new(codec, store);
        let err = resolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound), "got {err:?}");
    }

    #[tokio::test]
    async fn token_errors_propagate() {
        let codec = codec();
        let (store, account) = store_with("testuser").await;
        let resolver = SessionResolver::new(codec.clone(), store);

        let err = resolver.resolve("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedClaim(_)), "got {err:?}");

        let stale = codec
            .issue_at(&account, Utc::now() - Duration::hours(1))
            .unwrap();
        let err = resolver.resolve(&stale).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got {err:?}");
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let codec = codec();
        let (store, account) = store_with("testuser").await;
        let store: Arc<dyn CredentialStore> = store;
        let resolver = SessionResolver::new(codec.clone(), store);

        let token = codec.issue(&account).unwrap();
        assert_eq!(account.id, resolver.resolve(&token).await.unwrap().id);
    }
}
