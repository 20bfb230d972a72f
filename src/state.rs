use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::api::RequestValidator;
use crate::auth::{AuthError, JwtKeys};
use crate::config::AppConfig;
use crate::services::Services;

/// Shared, read-only application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: Arc<JwtKeys>,
    pub validator: Arc<RequestValidator>,
    pub services: Services,
    pub db: Option<PgPool>,
}

impl AppState {
    /// State backed by in-memory collaborators
    pub fn new(config: AppConfig, db: Option<PgPool>) -> Result<Self, AuthError> {
        let keys = JwtKeys::from_config(&config.jwt)?;
        Ok(Self {
            config: Arc::new(config),
            keys: Arc::new(keys),
            validator: Arc::new(RequestValidator::new()),
            services: Services::in_memory(),
            db,
        })
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl FromRef<AppState> for Arc<RequestValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.validator.clone()
    }
}

impl FromRef<AppState> for Services {
    fn from_ref(state: &AppState) -> Self {
        state.services.clone()
    }
}
