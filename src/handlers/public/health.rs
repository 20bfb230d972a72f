// handlers/public/health.rs - GET /health handler

use axum::extract::State;
use serde::Serialize;

use crate::api::{ApiResponse, ApiResult};
use crate::config::Environment;
use crate::database::{health_check, DatabaseStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub environment: Environment,
}

/**
 * GET /health - Liveness plus database connectivity
 *
 * Expected Output:
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "status": "ok",
 *     "message": "ERP API is running",
 *     "database": "ok | unavailable | disabled",
 *     "version": "0.1.0",
 *     "environment": "development"
 *   }
 * }
 * ```
 *
 * An unreachable database degrades `status` but the endpoint still answers 200.
 */
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let database = health_check(state.db.as_ref()).await;
    let status = match database {
        DatabaseStatus::Unavailable => "degraded",
        DatabaseStatus::Ok | DatabaseStatus::Disabled => "ok",
    };

    Ok(ApiResponse::ok(HealthResponse {
        status,
        message: "ERP API is running",
        database: database.as_str(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment,
    }))
}
