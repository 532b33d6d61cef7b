//! API server configuration.

use warden_core::config::{AuthConfig, ConfigError};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Default PostgreSQL connection URL.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/warden";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
    /// Token signing configuration.
    pub auth: AuthConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable         | Default                               |
    /// |------------------|---------------------------------------|
    /// | `BIND_ADDR`      | `127.0.0.1:8000`                      |
    /// | `DATABASE_URL`   | `postgres://localhost:5432/warden`    |
    /// | `CORS_ORIGIN`    | (none)                                |
    /// | `JWT_*`          | see [`AuthConfig::from_env`]          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            cors_origins: std::env::var("CORS_ORIGIN")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            auth: AuthConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
