//! Authentication middleware: bearer token extraction and session resolution.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use warden_core::models::auth::Account;

use crate::AppState;
use crate::error::AppError;

/// The account resolved from the request's bearer token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Axum middleware: extracts `Authorization: Bearer <token>`, resolves it to
/// a live account and injects [`CurrentAccount`] into request extensions.
///
/// Every protected route sits behind this; nothing else accepts tokens.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

        bearer_token(header)
            .map(str::to_owned)
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?
    };

    let account = state.sessions.resolve(&token).await?;

    request.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(request).await)
}

/// The token of a `Bearer` authorization header. The scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(Some("abc"), bearer_token("Bearer abc"));
        assert_eq!(Some("abc"), bearer_token("bearer  abc "));
        assert_eq!(None, bearer_token("Basic abc"));
        assert_eq!(None, bearer_token("Bearer "));
        assert_eq!(None, bearer_token("Bearerabc"));
    }
}
