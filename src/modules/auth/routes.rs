use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::services::guard;
use crate::AppState;

use super::controller;

pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/refresh", post(controller::refresh))
        .route("/logout", post(controller::logout))
        .route("/me", get(controller::me))
        .route(
            "/roles",
            get(controller::list_roles).route_layer(middleware::from_fn_with_state(
                state,
                guard::admin_gate,
            )),
        )
}
