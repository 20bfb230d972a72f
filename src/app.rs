// app.rs - Router assembly and the global middleware stack

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::JwtKeys;
use crate::config::CorsConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{access_log, auth_gate, error_boundary};
use crate::state::AppState;

/// Build the complete application.
///
/// Requests pass, outermost first: request id, tracing span, CORS, access
/// log, body limit, error boundary, auth gate, then the routes.
pub fn router(state: AppState) -> Router {
    let keys: Arc<JwtKeys> = state.keys.clone();
    let body_limit = state.config.server.body_limit_bytes;
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(public::routes())
        .merge(protected::routes())
        .fallback(fallback)
        .layer(from_fn_with_state(keys, auth_gate))
        .layer(from_fn(error_boundary))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(access_log))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn fallback() -> ApiError {
    ApiError::not_found("请求的资源不存在")
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
