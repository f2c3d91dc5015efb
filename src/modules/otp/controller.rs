use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::{
    crud::AuthCrud,
    interface::{AuthError, Result},
    schema::{validate_password, ApiResponse},
};
use crate::services::hashing;
use crate::AppState;

use super::crud::OtpCrud;
use super::schema::{EmailRequest, ExchangeTokenResponse, ResetPasswordRequest, VerifyOtpRequest};

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<impl IntoResponse> {
    generate_and_send(&state, &req, "Password Reset OTP", "Your OTP code is").await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("OTP sent to your mail", None::<()>, 200)),
    ))
}

/// Same as `send_otp`: reissuing restarts the 5-minute window and
/// invalidates the previous code.
pub async fn resend_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<impl IntoResponse> {
    generate_and_send(&state, &req, "Password Reset OTP", "Your OTP code is").await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok("OTP sent to your mail", None::<()>, 200)),
    ))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = AuthCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let token = OtpCrud::new(state.db.clone())
        .verify_code(&user.id, &req.otp)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "OTP verified successfully.",
            ExchangeTokenResponse { token },
            200,
        )),
    ))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    validate_password(&req.password)?;

    let password_hash = hashing::hash_password(&req.password)?;

    let user_id = OtpCrud::new(state.db.clone())
        .reset_password(&req.token, &password_hash)
        .await?;

    tracing::info!(user_id, "password reset completed, sessions revoked");

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Password reset successfully.",
            None::<()>,
            200,
        )),
    ))
}

pub async fn send_email_verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<impl IntoResponse> {
    generate_and_send(&state, &req, "Verify your email", "Your verification code is").await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Verification code sent to your email.",
            None::<()>,
            200,
        )),
    ))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = AuthCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    OtpCrud::new(state.db.clone())
        .verify_email(&user.id, &req.otp)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Email verified successfully.",
            None::<()>,
            200,
        )),
    ))
}

/// Shared issue-and-dispatch path for both OTP flows. Responding 404 for
/// unknown emails leaks account existence; kept for interface compatibility
/// and recorded as a known inconsistency in DESIGN.md.
async fn generate_and_send(
    state: &Arc<AppState>,
    req: &EmailRequest,
    subject: &'static str,
    body_prefix: &str,
) -> Result<()> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = AuthCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let code = OtpCrud::new(state.db.clone()).issue_code(&user.id).await?;

    // Dispatch off the critical path; delivery failures are logged rather
    // than failing a response the client already treats as "sent".
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let body = format!("{body_prefix}: {code}");
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, subject, &body).await {
            tracing::error!(error = %e, to, "OTP mail dispatch failed");
        }
    });

    Ok(())
}
