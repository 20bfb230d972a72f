// handlers/protected/accounting/journal_entries.rs - /api/v1/accounting/journal-entries

use axum::extract::State;

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::accounting::{ensure_balanced, CreateJournalEntryRequest, JournalEntryResponse, UpdateJournalEntryRequest};
use crate::handlers::paginated;
use crate::services::accounting::{JournalEntryCriteria, JournalEntryDraft, JournalEntryPatch};
use crate::services::{CrudService, RequestContext, Services};

/// GET /journal-entries - `status`, `start_date`, `end_date` and `keyword` filter the list
pub async fn list(
    State(services): State<Services>,
    ctx: RequestContext,
    query: StandardList,
) -> ApiResult<Vec<JournalEntryResponse>> {
    let criteria = JournalEntryCriteria {
        status: query.typed("status")?,
    };
    let page = services.journal_entries.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /journal-entries - Record a draft voucher
 *
 * Expected Input:
 * ```json
 * {
 *   "entry_date": "2024-01-15",
 *   "description": "string",
 *   "lines": [
 *     { "account_id": 1, "debit": "100.00", "summary": "string" },
 *     { "account_id": 2, "credit": "100.00" }
 *   ]
 * }
 * ```
 *
 * At least two lines; debits must equal credits ("借贷金额不平衡" otherwise).
 */
pub async fn create(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateJournalEntryRequest>,
) -> ApiResult<JournalEntryResponse> {
    ensure_balanced(&request.lines)?;
    let entry = services.journal_entries.create(&ctx, JournalEntryDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(entry.into()).message("凭证创建成功"))
}

/// GET /journal-entries/:id
pub async fn get(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<JournalEntryResponse> {
    let entry = services.journal_entries.get(&ctx, id).await?;
    Ok(ApiResponse::ok(entry.into()))
}

/// PUT /journal-entries/:id - Only draft entries can change
pub async fn update(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateJournalEntryRequest>,
) -> ApiResult<JournalEntryResponse> {
    if let Some(lines) = &request.lines {
        ensure_balanced(lines)?;
    }
    let entry = services.journal_entries.update(&ctx, id, JournalEntryPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(entry.into()).message("凭证更新成功"))
}

/// DELETE /journal-entries/:id - Only draft entries can be removed
pub async fn delete(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.journal_entries.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("凭证删除成功"))
}

/// POST /journal-entries/:id/post - draft → posted
pub async fn post(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<JournalEntryResponse> {
    let entry = services.journal_entries.post(&ctx, id).await?;
    Ok(ApiResponse::ok(entry.into()).message("凭证过账成功"))
}

/// POST /journal-entries/:id/void - posted → voided
pub async fn void(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<JournalEntryResponse> {
    let entry = services.journal_entries.void(&ctx, id).await?;
    Ok(ApiResponse::ok(entry.into()).message("凭证作废成功"))
}
