// handlers/protected/accounting/mod.rs - Chart of accounts and journal entries

pub mod accounts;
pub mod journal_entries;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/:id",
            get(accounts::get).put(accounts::update).delete(accounts::delete),
        )
        .route("/journal-entries", get(journal_entries::list).post(journal_entries::create))
        .route(
            "/journal-entries/:id",
            get(journal_entries::get)
                .put(journal_entries::update)
                .delete(journal_entries::delete),
        )
        .route("/journal-entries/:id/post", post(journal_entries::post))
        .route("/journal-entries/:id/void", post(journal_entries::void))
}
