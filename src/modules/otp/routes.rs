use axum::{routing::post, Router};
use std::sync::Arc;

use crate::AppState;

use super::controller;

pub fn otp_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forget-password", post(controller::send_otp))
        .route("/resend-otp", post(controller::resend_otp))
        .route("/verify-otp", post(controller::verify_otp))
        .route("/reset-password", post(controller::reset_password))
        .route("/verify-email-otp", post(controller::send_email_verify_otp))
        .route("/verify-email", post(controller::verify_email))
}
