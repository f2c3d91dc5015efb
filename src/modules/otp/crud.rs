use chrono::Utc;
use uuid::Uuid;

use crate::config::DbPool;
use crate::modules::auth::interface::{AuthError, Result};
use crate::services::tokens;

use super::model::UserOtp;

pub struct OtpCrud {
    pool: DbPool,
}

impl OtpCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh code for the user, superseding any prior one. The
    /// delete-then-insert runs in one transaction so there is never more
    /// than one active code per user.
    pub async fn issue_code(&self, user_id: &str) -> Result<String> {
        let code = tokens::generate_otp_code();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_otps WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_otps (id, user_id, otp_code, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&code)
        .bind(now + tokens::otp_ttl())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(code)
    }

    /// Verify a password-reset code and mint the exchange token that
    /// authorizes the actual reset. The code row survives, marked with the
    /// token digest; the row lock plus the unverified predicate make the
    /// code single-use even under concurrent requests.
    pub async fn verify_code(&self, user_id: &str, code: &str) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        let otp = sqlx::query_as::<_, UserOtp>(
            r#"
            SELECT * FROM user_otps
            WHERE user_id = ? AND otp_code = ? AND expires_at > ? AND exchange_token_hash IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::InvalidOtp)?;

        let exchange_token = tokens::generate_token();

        sqlx::query("UPDATE user_otps SET exchange_token_hash = ? WHERE id = ?")
            .bind(tokens::hash_token(&exchange_token))
            .bind(&otp.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(exchange_token)
    }

    /// Consume a verified exchange token: update the password, revoke every
    /// access token for the user (forces re-login on all devices) and
    /// delete the OTP record, all atomically.
    pub async fn reset_password(&self, exchange_token: &str, password_hash: &str) -> Result<String> {
        let hash = tokens::hash_token(exchange_token);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let otp = sqlx::query_as::<_, UserOtp>(
            r#"
            SELECT * FROM user_otps
            WHERE exchange_token_hash = ? AND expires_at > ?
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(&hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::InvalidExchangeToken)?;

        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now)
            .bind(&otp.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(&otp.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_otps WHERE id = ?")
            .bind(&otp.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(otp.user_id)
    }

    /// One-shot email verification: match the code, flip the flag, delete
    /// the row.
    pub async fn verify_email(&self, user_id: &str, code: &str) -> Result<()> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let otp = sqlx::query_as::<_, UserOtp>(
            r#"
            SELECT * FROM user_otps
            WHERE user_id = ? AND otp_code = ? AND expires_at > ?
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::InvalidOtp)?;

        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_otps WHERE id = ?")
            .bind(&otp.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
