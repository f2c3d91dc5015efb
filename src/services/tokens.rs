//! Opaque token generation and digests.
//!
//! Every credential handed to a client is a random value; the store only
//! ever sees its SHA-256 digest, so a database leak exposes no usable
//! tokens. Lifetimes are owned here so the auth and OTP flows agree on
//! them.

use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bearer access tokens live for one hour server-side.
pub fn access_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Refresh tokens live for 15 days; rotation replaces them well before that.
pub fn refresh_token_ttl() -> Duration {
    Duration::days(15)
}

/// One-time codes expire five minutes after issue.
pub fn otp_ttl() -> Duration {
    Duration::minutes(5)
}

/// Generate an opaque 64-byte token, hex-encoded for transport.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 64];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 digest of a token value, the only form ever persisted.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Uniformly random 6-digit code, 100000..=999999.
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100000..=999999);
    code.to_string()
}
