//! Session token issuance and verification (compact JWS via `jsonwebtoken`).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use tracing::debug;

use super::AuthError;
use crate::config::AuthConfig;
use crate::models::auth::{Account, SessionClaims};

/// Claims as they arrive on the wire, before required fields are checked.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    account_id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    token_expires: Option<f64>,
}

impl WireClaims {
    fn into_claims(self) -> Result<SessionClaims, AuthError> {
        let missing = |field: &str| AuthError::MalformedClaim(format!("{field} is missing"));
        Ok(SessionClaims {
            account_id: self.account_id.ok_or_else(|| missing("account_id"))?,
            username: self.username.ok_or_else(|| missing("username"))?,
            email: self.email.ok_or_else(|| missing("email"))?,
            last_login: self.last_login,
            token_expires: self.token_expires.ok_or_else(|| missing("token_expires"))?,
        })
    }
}

/// Epoch seconds with sub-second precision.
fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

/// Signs and verifies session tokens with a fixed key, algorithm and lifetime.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            algorithm: config.algorithm(),
            lifetime: Duration::try_minutes(config.token_lifetime_minutes())
                .unwrap_or(Duration::MAX),
        }
    }

    /// Issue a signed token for `account`, expiring one lifetime from now.
    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a signed token as if the current time were `issued_at`.
    pub fn issue_at(&self, account: &Account, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let expires = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".into()))?;
        let claims = SessionClaims {
            account_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            last_login: account.last_login,
            token_expires: epoch_seconds(expires),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token's signature and structure, then its expiry.
    ///
    /// Expired tokens are always rejected, whatever the library's own `exp`
    /// handling would do; the expiry lives in `token_expires`.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode_at(token, Utc::now())
    }

    /// [`decode`](Self::decode) against an explicit current time.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        let data = decode::<WireClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => AuthError::InvalidSignature,
                _ => AuthError::MalformedClaim(e.to_string()),
            }
        })?;

        let claims = data.claims.into_claims()?;
        if epoch_seconds(now) >= claims.token_expires {
            debug!(account_id = claims.account_id, "token expired");
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
