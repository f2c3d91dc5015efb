pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{Config, DbPool};
use modules::auth::auth_routes;
use modules::otp::otp_routes;
use services::mailer::Mailer;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

pub async fn create_app(db: DbPool, config: Config, mailer: Arc<dyn Mailer>) -> Router {
    let state = Arc::new(AppState { db, config, mailer });

    // Auth endpoints are brute-force targets: burst of 30, then 60/min.
    let rate_limiter = create_rate_limiter(60, 30);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/v1", auth_routes(state.clone()).merge(otp_routes()))
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Wellness Studio API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
