use axum_test::{TestResponse, TestServer};
use sqlx::{MySql, Pool};
use std::sync::Arc;

use studio_auth::config::Config;
use studio_auth::services::mailer::LogMailer;

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: Pool<MySql>,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

        let db = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let config = Config {
            database_url,
            app_env: "local".to_string(),
        };

        let app = studio_auth::create_app(db.clone(), config, Arc::new(LogMailer)).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, db }
    }

    /// Remove a single test user; FK cascades drop their tokens and OTPs.
    /// Scoped per email so parallel tests never clobber each other.
    pub async fn cleanup_user(&self, email: &str) {
        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&self.db)
            .await
            .ok();
    }

    pub async fn user_id_by_email(&self, email: &str) -> String {
        let row: (String,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .expect("user should exist");
        row.0
    }

    /// Read the latest OTP code for a user straight from the store; the
    /// mailer in tests only logs, so this is the delivery channel.
    pub async fn latest_otp_code(&self, email: &str) -> String {
        let user_id = self.user_id_by_email(email).await;
        let row: (String,) = sqlx::query_as(
            "SELECT otp_code FROM user_otps WHERE user_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&user_id)
        .fetch_one(&self.db)
        .await
        .expect("OTP should exist");
        row.0
    }

    /// Backdate the user's OTP so expiry paths can be exercised without
    /// sleeping through the five-minute window.
    pub async fn expire_otp(&self, email: &str) {
        let user_id = self.user_id_by_email(email).await;
        sqlx::query(
            "UPDATE user_otps SET expires_at = DATE_SUB(NOW(6), INTERVAL 1 MINUTE) WHERE user_id = ?",
        )
        .bind(&user_id)
        .execute(&self.db)
        .await
        .expect("failed to expire OTP");
    }

    pub async fn set_role(&self, email: &str, role: &str) {
        sqlx::query("UPDATE users SET role = ? WHERE email = ?")
            .bind(role)
            .bind(email)
            .execute(&self.db)
            .await
            .expect("failed to set role");
    }

    pub async fn is_verified(&self, email: &str) -> bool {
        let row: (bool,) = sqlx::query_as("SELECT is_verified FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .expect("user should exist");
        row.0
    }
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "Studio123"
}

/// Pull the refreshToken value out of a response's Set-Cookie header.
#[allow(dead_code)]
pub fn refresh_cookie_value(response: &TestResponse) -> Option<String> {
    let header = response.headers().get(axum::http::header::SET_COOKIE)?;
    let value = header.to_str().ok()?;
    let first = value.split(';').next()?;
    let token = first.strip_prefix("refreshToken=")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Build a Cookie header value presenting a refresh token.
#[allow(dead_code)]
pub fn refresh_cookie_header(token: &str) -> String {
    format!("refreshToken={token}")
}
