// handlers/public/mod.rs - Endpoints reachable without a token
//
// Every path here must also appear in `middleware::auth::PUBLIC_PATHS`.

pub mod auth;
pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
}
