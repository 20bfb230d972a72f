// handlers/protected/mod.rs - Endpoints behind the auth gate
//
// Route prefix: /api/v1/<group>. The gate has already attached a `Principal`
// by the time any of these run.

pub mod accounting;
pub mod auth;
pub mod hr;
pub mod inventory;
pub mod production;
pub mod project;
pub mod purchase;
pub mod sales;
pub mod system;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .nest("/api/v1/accounting", accounting::routes())
        .nest("/api/v1/inventory", inventory::routes())
        .nest("/api/v1/sales", sales::routes())
        .nest("/api/v1/purchase", purchase::routes())
        .nest("/api/v1/production", production::routes())
        .nest("/api/v1/hr", hr::routes())
        .nest("/api/v1/project", project::routes())
        .nest("/api/v1/system", system::routes())
}
