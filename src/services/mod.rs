pub mod guard;
pub mod hashing;
pub mod mailer;
pub mod rate_limit;
pub mod security;
pub mod tokens;
