// handlers/public/auth.rs - Token acquisition endpoints

use axum::extract::State;
use tracing::info;

use crate::api::{ApiResponse, ApiResult, ValidatedJson};
use crate::dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::dto::require;
use crate::error::ApiError;
use crate::services::users::NewUser;
use crate::services::RequestContext;
use crate::state::AppState;

/**
 * POST /api/v1/auth/register - Create a user account
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "string",   // Required: 3-32 characters, unique
 *   "email": "string",      // Required
 *   "password": "string",   // Required: 8+ chars with upper, lower and digit
 *   "real_name": "string",  // Optional
 *   "phone": "string"       // Optional: mainland mobile number
 * }
 * ```
 *
 * Responds 201 with the new user; a taken username is 409 "用户名已存在".
 */
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<UserResponse> {
    let new_user = NewUser::try_from(request)?;
    let user = state.services.users.register(&ctx, new_user).await?;
    Ok(ApiResponse::created(user.into()).message("注册成功"))
}

/**
 * POST /api/v1/auth/login - Authenticate and receive a bearer token
 *
 * Expected Input:
 * ```json
 * { "username": "string", "password": "string" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "message": "登录成功",
 *   "data": {
 *     "token": "eyJhbGciOiJIUzI1NiI...",
 *     "token_type": "Bearer",
 *     "expires_at": "2024-01-02T00:00:00Z",
 *     "user": { "id": 1, "username": "admin", ... }
 *   }
 * }
 * ```
 */
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = require(request.username, "username")?;
    let password = require(request.password, "password")?;

    let user = state.services.users.authenticate(&ctx, username.trim(), &password).await?;
    let issued = state.keys.issue(user.id, &user.username)?;

    info!(request_id = ctx.request_id(), user_id = user.id, "token issued");
    Ok(ApiResponse::ok(LoginResponse::new(issued, user)).message("登录成功"))
}

/// POST /api/v1/auth/refresh - Not offered; clients log in again
pub async fn refresh() -> ApiResult<()> {
    Err(ApiError::not_implemented("令牌刷新功能暂未实现"))
}

/// POST /api/v1/auth/logout - Tokens are stateless, so this only acknowledges
pub async fn logout() -> ApiResult<()> {
    Ok(ApiResponse::ok(()).message("登出成功"))
}
