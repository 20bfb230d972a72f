// handlers/protected/accounting/accounts.rs - /api/v1/accounting/accounts

use axum::extract::State;

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::accounting::{AccountResponse, CreateAccountRequest, UpdateAccountRequest};
use crate::handlers::paginated;
use crate::services::accounting::{AccountCriteria, AccountDraft, AccountPatch};
use crate::services::{CrudService, RequestContext, Services};

/// GET /accounts - Paginated chart of accounts; `account_type` narrows by type
pub async fn list(State(services): State<Services>, ctx: RequestContext, query: StandardList) -> ApiResult<Vec<AccountResponse>> {
    let criteria = AccountCriteria {
        account_type: query.typed("account_type")?,
    };
    let page = services.accounts.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /accounts - Open a new account
 *
 * Expected Input:
 * ```json
 * {
 *   "code": "1001",             // Required, unique
 *   "name": "库存现金",          // Required
 *   "account_type": "asset",    // Required: asset|liability|equity|revenue|expense|cost
 *   "parent_id": 1,             // Optional
 *   "description": "string"     // Optional
 * }
 * ```
 */
pub async fn create(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<AccountResponse> {
    let account = services.accounts.create(&ctx, AccountDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(account.into()).message("科目创建成功"))
}

/// GET /accounts/:id
pub async fn get(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<AccountResponse> {
    let account = services.accounts.get(&ctx, id).await?;
    Ok(ApiResponse::ok(account.into()))
}

/// PUT /accounts/:id - Partial update; the code is immutable
pub async fn update(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateAccountRequest>,
) -> ApiResult<AccountResponse> {
    let account = services.accounts.update(&ctx, id, AccountPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(account.into()).message("科目更新成功"))
}

/// DELETE /accounts/:id
pub async fn delete(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.accounts.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("科目删除成功"))
}
