use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Ok(Self {
            database_url,
            app_env,
        })
    }

    /// Local and dev deployments serve plain HTTP, so the refresh cookie
    /// must not carry the Secure attribute there.
    pub fn is_local(&self) -> bool {
        matches!(self.app_env.as_str(), "local" | "dev" | "development")
    }
}
