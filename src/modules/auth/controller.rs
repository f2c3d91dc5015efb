use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::services::{guard::AuthUser, hashing};
use crate::AppState;

use super::crud::{AuthCrud, SessionTokens};
use super::interface::{AuthError, Result};
use super::model::{Role, User};
use super::schema::{
    validate_password, ApiResponse, LoginRequest, RegisterRequest, RolesResponse, SessionResponse,
    UserResponse,
};

const REFRESH_COOKIE: &str = "refreshToken";
const REFRESH_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 15;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    validate_password(&req.password)?;

    if req.password != req.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }

    let crud = AuthCrud::new(state.db.clone());

    if crud.email_exists(&req.email).await? {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hashing::hash_password(&req.password)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        full_name: req.full_name.clone(),
        email: req.email.clone(),
        password_hash,
        role: Role::Student,
        is_verified: false,
        is_first_time: true,
        refresh_token_hash: None,
        refresh_token_expires_at: None,
        created_at: now,
        updated_at: now,
    };

    crud.create_user(&user).await?;

    // Auto-login after registration: the client gets a working session
    // without a second round trip.
    let tokens = crud.issue_session(&user.id).await?;

    session_response(
        StatusCode::CREATED,
        "Register success",
        &user,
        tokens,
        state.config.is_local(),
    )
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let crud = AuthCrud::new(state.db.clone());

    let user = crud
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::UnknownEmail)?;

    if !hashing::verify_password(&req.password, &user.password_hash)? {
        return Err(AuthError::IncorrectPassword);
    }

    let tokens = crud.issue_session(&user.id).await?;

    session_response(
        StatusCode::OK,
        "Login success",
        &user,
        tokens,
        state.config.is_local(),
    )
}

/// The refresh token is read from the httpOnly cookie only, never from the
/// body or headers, so it cannot leak through request logs.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let presented = extract_refresh_cookie(&headers).ok_or(AuthError::MissingRefreshToken)?;

    let crud = AuthCrud::new(state.db.clone());
    let (user, tokens) = crud.refresh_session(&presented).await?;

    session_response(
        StatusCode::OK,
        "successful",
        &user,
        tokens,
        state.config.is_local(),
    )
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse> {
    let crud = AuthCrud::new(state.db.clone());
    crud.logout(&user.id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear_refresh_cookie()?);

    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::ok("Logged out", None::<()>, 200)),
    ))
}

pub async fn me(AuthUser(user): AuthUser) -> Result<impl IntoResponse> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("successful", UserResponse::from(&user), 200)),
    ))
}

/// Admin-only role catalogue; the role gate runs as a route layer before
/// this handler.
pub async fn list_roles() -> Result<impl IntoResponse> {
    let roles = RolesResponse {
        roles: Role::ALL.iter().map(Role::as_str).collect(),
    };

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("successful", roles, 200)),
    ))
}

fn session_response(
    status: StatusCode,
    message: &str,
    user: &User,
    tokens: SessionTokens,
    is_local: bool,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<SessionResponse>>)> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        refresh_cookie(&tokens.refresh_token, !is_local)?,
    );

    let data = SessionResponse {
        user: UserResponse::from(user),
        access_token: tokens.access_token,
    };

    Ok((
        status,
        headers,
        Json(ApiResponse::ok(message, data, status.as_u16())),
    ))
}

fn refresh_cookie(token: &str, secure: bool) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={REFRESH_COOKIE_MAX_AGE_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AuthError::Internal(e.to_string()))
}

fn clear_refresh_cookie() -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0"
    ))
    .map_err(|e| AuthError::Internal(e.to_string()))
}

fn extract_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let name = parts.next()?.trim();
        if name == REFRESH_COOKIE {
            let token = parts.next()?.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    None
}
