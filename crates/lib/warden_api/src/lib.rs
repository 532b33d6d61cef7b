//! # warden_api
//!
//! HTTP API library for Warden.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use warden_core::auth::{PasswordVerifier, SessionResolver, TokenCodec};
use warden_core::config::AuthConfig;
use warden_core::store::CredentialStore;

use crate::handlers::{auth, health, user};

/// Shared application state passed to all handlers.
///
/// Everything in here is read-only after startup, so clones share it freely.
#[derive(Clone)]
pub struct AppState {
    /// Account and credential persistence.
    pub store: Arc<dyn CredentialStore>,
    /// Session token signing and verification.
    pub codec: Arc<TokenCodec>,
    /// Username/password checks.
    pub verifier: Arc<PasswordVerifier<dyn CredentialStore>>,
    /// Bearer token → account.
    pub sessions: Arc<SessionResolver<dyn CredentialStore>>,
}

impl AppState {
    /// Wire the authentication components around `store`.
    pub fn new(store: Arc<dyn CredentialStore>, auth: &AuthConfig) -> Self {
        let codec = Arc::new(TokenCodec::new(auth));
        Self {
            verifier: Arc::new(PasswordVerifier::new(store.clone())),
            sessions: Arc::new(SessionResolver::new(codec.clone(), store.clone())),
            store,
            codec,
        }
    }
}

/// Builds a CORS layer for the configured origins, or `None` when there are none.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, "ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (require a valid bearer token)
    let protected = Router::new()
        .route("/auth/verify", post(auth::verify_handler))
        .route("/user/me", get(user::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let app = Router::new().merge(public).merge(protected);
    let app = match cors_layer(cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    };
    app.with_state(state)
}
