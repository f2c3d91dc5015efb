use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One-time code row. At most one active row per user; issuing a new code
/// deletes prior ones. `exchange_token_hash` is set once the code has been
/// verified in the password-reset flow and gates the reset itself.
#[derive(Debug, Clone, FromRow)]
pub struct UserOtp {
    pub id: String,
    pub user_id: String,
    pub otp_code: String,
    pub exchange_token_hash: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
