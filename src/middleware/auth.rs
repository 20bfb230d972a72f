use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{bearer_token, AuthError, JwtKeys, Principal};
use crate::error::ApiError;

/// Routes reachable without a bearer token
pub const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/v1/auth/register",
    "/api/v1/auth/login",
    "/api/v1/auth/refresh",
    "/api/v1/auth/logout",
];

pub fn is_public(path: &str) -> bool {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    PUBLIC_PATHS.contains(&path)
}

/// Bearer-token gate in front of every non-public route.
///
/// On success the verified [`Principal`] is inserted into the request
/// extensions; any failure ends the request with 401 before a handler runs.
pub async fn auth_gate(State(keys): State<Arc<JwtKeys>>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let principal = authenticate(&keys, &request)?;
    debug!(user_id = principal.user_id(), "request authenticated");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn authenticate(keys: &JwtKeys, request: &Request) -> Result<Principal, AuthError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };
    let token = bearer_token(header)?;
    keys.verify(token)
}
