//! Bearer-token authentication and the role gate.
//!
//! Access tokens are opaque values whose SHA-256 digest is stored server
//! side, so a token is valid exactly while its row exists and is unexpired.
//! Logout and password reset revoke by deleting rows.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

use crate::modules::auth::{
    interface::{AuthError, Result},
    model::{Role, User},
};
use crate::services::tokens;
use crate::AppState;

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolve the Authorization header to a user via the access-token store.
pub async fn authenticate_bearer(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let token = extract_bearer(headers).ok_or(AuthError::MissingAccessToken)?;
    let hash = tokens::hash_token(&token);

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        INNER JOIN access_tokens t ON t.user_id = u.id
        WHERE t.token_hash = ? AND t.expires_at > ?
        "#,
    )
    .bind(&hash)
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AuthError::InvalidAccessToken)?;

    Ok(user)
}

/// Extractor form of the guard for handlers that need the caller's identity.
pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let user = authenticate_bearer(state, &parts.headers).await?;
        Ok(AuthUser(user))
    }
}

/// Stateless role check applied after authentication.
pub fn check_role(user: &User, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

async fn gate(
    state: Arc<AppState>,
    mut request: Request,
    next: Next,
    allowed: &'static [Role],
) -> Result<Response> {
    let user = authenticate_bearer(&state, request.headers()).await?;
    check_role(&user, allowed)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Route layer for admin-only endpoints.
pub async fn admin_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    gate(state, request, next, &[Role::Admin]).await
}
