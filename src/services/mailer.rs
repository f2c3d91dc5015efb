//! Outbound notification collaborator.
//!
//! Real delivery (SMTP, push, SMS) is owned by an external service; the
//! trait is the seam. The default implementation logs the message so OTP
//! flows stay observable in environments without a mail relay.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Mail dispatch failed: {0}")]
    Dispatch(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

/// Logs instead of sending. Used in local/dev and as the test double.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        tracing::info!(to, subject, body, "outbound mail");
        Ok(())
    }
}
