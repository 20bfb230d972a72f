// handlers/protected/auth.rs - GET /api/v1/auth/me handler

use axum::extract::State;

use crate::api::{ApiResponse, ApiResult, CurrentUser};
use crate::dto::auth::UserResponse;
use crate::services::RequestContext;
use crate::state::AppState;

/// GET /api/v1/auth/me - Account behind the presented token
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ctx: RequestContext,
) -> ApiResult<UserResponse> {
    let user = state.services.users.find(&ctx, principal.user_id()).await?;
    Ok(ApiResponse::ok(user.into()))
}
