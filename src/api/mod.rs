mod admins;
pub mod auth;
pub mod error;
mod validation;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (login and refresh are public, logout authenticates
    // through the bearer extractor)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout));

    // Admin account routes, all behind the bearer extractor
    let admin_routes = Router::new()
        .route("/", post(admins::register_admin))
        .route("/", get(admins::list_admins))
        .route("/:id", get(admins::get_admin))
        .route("/:id", put(admins::update_admin))
        .route("/:id/password", put(admins::update_password));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/admins", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
