//! Token signing configuration.
//!
//! Built once at startup and handed to [`TokenCodec::new`](crate::auth::jwt::TokenCodec::new).
//! Nothing here is mutated afterwards.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use jsonwebtoken::Algorithm;

/// Default signature algorithm when `JWT_ALGORITHM` is unset.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Default token lifetime in minutes when `JWT_TOKEN_LIFETIME` is unset.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 60 * 24 * 366;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Signing key, algorithm and lifetime for session tokens.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    algorithm: Algorithm,
    token_lifetime_minutes: i64,
}

impl AuthConfig {
    /// Validate and build a configuration.
    ///
    /// The secret must be non-empty, the algorithm must be one of the HMAC
    /// family (`HS256`, `HS384`, `HS512`) and the lifetime must be positive
    /// and at most [`MAX_TOKEN_LIFETIME_MINUTES`].
    pub fn new(
        secret: impl Into<String>,
        algorithm: Algorithm,
        token_lifetime_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET_KEY"));
        }
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::Invalid {
                name: "JWT_ALGORITHM",
                reason: format!("{algorithm:?} is not a symmetric algorithm"),
            });
        }
        if token_lifetime_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TOKEN_LIFETIME",
                reason: format!("{token_lifetime_minutes} is not a positive number of minutes"),
            });
        }
        if token_lifetime_minutes > MAX_TOKEN_LIFETIME_MINUTES {
            return Err(ConfigError::Invalid {
                name: "JWT_TOKEN_LIFETIME",
                reason: format!(
                    "{token_lifetime_minutes} minutes exceeds the maximum of {MAX_TOKEN_LIFETIME_MINUTES}"
                ),
            });
        }
        Ok(Self {
            secret,
            algorithm,
            token_lifetime_minutes,
        })
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable             | Default    |
    /// |----------------------|------------|
    /// | `JWT_SECRET_KEY`     | (required) |
    /// | `JWT_ALGORITHM`      | `HS256`    |
    /// | `JWT_TOKEN_LIFETIME` | `30`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;

        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(name) if !name.is_empty() => parse_algorithm(&name)?,
            _ => DEFAULT_ALGORITHM,
        };

        let lifetime = match std::env::var("JWT_TOKEN_LIFETIME") {
            Ok(raw) if !raw.is_empty() => {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::Invalid {
                        name: "JWT_TOKEN_LIFETIME",
                        reason: e.to_string(),
                    })?
            }
            _ => DEFAULT_TOKEN_LIFETIME_MINUTES,
        };

        Self::new(secret, algorithm, lifetime)
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_lifetime_minutes(&self) -> i64 {
        self.token_lifetime_minutes
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_lifetime_minutes", &self.token_lifetime_minutes)
            .finish()
    }
}

/// Parse an algorithm name such as `HS256`.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    Algorithm::from_str(name.trim()).map_err(|e| ConfigError::Invalid {
        name: "JWT_ALGORITHM",
        reason: format!("{name}: {e}"),
    })
}
