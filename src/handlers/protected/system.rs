// handlers/protected/system.rs - /api/v1/system/users administration

use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::database::models::RecordStatus;
use crate::dto::auth::UserResponse;
use crate::dto::UpdateStatusRequest;
use crate::handlers::paginated;
use crate::services::{RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list))
        .route("/users/:id", get(show))
        .route("/users/:id/status", patch(update_status))
}

pub async fn list(State(services): State<Services>, ctx: RequestContext, query: StandardList) -> ApiResult<Vec<UserResponse>> {
    let page = services.users.list(&ctx, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn show(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<UserResponse> {
    Ok(ApiResponse::ok(services.users.find(&ctx, id).await?.into()))
}

/**
 * PATCH /users/:id/status - Enable or disable an account
 *
 * Expected Input:
 * ```json
 * { "status": "active | inactive" }
 * ```
 *
 * Users cannot change their own status.
 */
pub async fn update_status(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<UserResponse> {
    let status = RecordStatus::try_from(request)?;
    let user = services.users.set_status(&ctx, id, status).await?;
    Ok(ApiResponse::ok(user.into()).message("用户状态更新成功"))
}
