use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure taxonomy for the whole auth subsystem. Each variant carries the
/// user-visible message; internals stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email or password. Try again")]
    UnknownEmail,

    #[error("Incorrect Password")]
    IncorrectPassword,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Refresh token not found")]
    MissingRefreshToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Unauthenticated")]
    MissingAccessToken,

    #[error("Invalid or expired access token")]
    InvalidAccessToken,

    #[error("You can't access this route!")]
    Forbidden,

    #[error("Invalid OTP code")]
    InvalidOtp,

    #[error("Invalid Token")]
    InvalidExchangeToken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UserNotFound | Self::UnknownEmail => StatusCode::NOT_FOUND,
            Self::IncorrectPassword
            | Self::MissingRefreshToken
            | Self::InvalidRefreshToken
            | Self::MissingAccessToken
            | Self::InvalidAccessToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidOtp | Self::InvalidExchangeToken => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Hashing(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Store and hashing failures are logged in full; clients get a
        // generic message instead of internals.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal auth failure");
            "Something went wrong. Try again later".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
