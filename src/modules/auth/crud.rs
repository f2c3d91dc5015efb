use chrono::Utc;
use sqlx::MySql;
use uuid::Uuid;

use crate::config::DbPool;
use crate::services::tokens;

use super::interface::{AuthError, Result};
use super::model::User;

/// Plaintext credential pair handed to the client once. Only digests are
/// persisted.
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthCrud {
    pool: DbPool,
}

impl AuthCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, is_verified, is_first_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_verified)
        .bind(user.is_first_time)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    /// Issue a fresh access token and rotate the refresh token in one
    /// transaction, so a failure can never leave a half-updated pair.
    /// Rotation overwrites unconditionally; any prior refresh token dies
    /// here.
    pub async fn issue_session(&self, user_id: &str) -> Result<SessionTokens> {
        let mut tx = self.pool.begin().await?;

        let refresh_token = rotate_refresh_token(&mut tx, user_id).await?;
        let access_token = insert_access_token(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a presented refresh token for a new session. The row lock
    /// makes rotation exactly-once: two concurrent refreshes with the same
    /// cookie serialize, and the loser no longer matches the stored hash.
    /// Unknown and expired tokens are indistinguishable on purpose.
    pub async fn refresh_session(&self, presented: &str) -> Result<(User, SessionTokens)> {
        let hash = tokens::hash_token(presented);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE refresh_token_hash = ? AND refresh_token_expires_at > ?
            FOR UPDATE
            "#,
        )
        .bind(&hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        let refresh_token = rotate_refresh_token(&mut tx, &user.id).await?;
        let access_token = insert_access_token(&mut *tx, &user.id).await?;

        tx.commit().await?;

        Ok((
            user,
            SessionTokens {
                access_token,
                refresh_token,
            },
        ))
    }

    /// Multi-device logout: drops every access token and clears the refresh
    /// token state. Safe to call repeatedly.
    pub async fn logout(&self, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = NULL, refresh_token_expires_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

async fn rotate_refresh_token(
    tx: &mut sqlx::Transaction<'_, MySql>,
    user_id: &str,
) -> Result<String> {
    let refresh_token = tokens::generate_token();
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET refresh_token_hash = ?, refresh_token_expires_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(tokens::hash_token(&refresh_token))
    .bind(now + tokens::refresh_token_ttl())
    .bind(now)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(refresh_token)
}

/// Insert a hashed one-hour bearer token row and return the plaintext.
/// Multiple rows per user may coexist (multi-device sessions).
async fn insert_access_token<'e, E>(executor: E, user_id: &str) -> Result<String>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let access_token = tokens::generate_token();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO access_tokens (id, user_id, token_hash, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(tokens::hash_token(&access_token))
    .bind(now + tokens::access_token_ttl())
    .bind(now)
    .execute(executor)
    .await?;

    Ok(access_token)
}
