// handlers/protected/production.rs - /api/v1/production/work-orders

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::production::{CreateWorkOrderRequest, UpdateWorkOrderRequest, WorkOrderResponse};
use crate::handlers::paginated;
use crate::services::production::{WorkOrderCriteria, WorkOrderDraft, WorkOrderPatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/work-orders", get(list).post(create))
        .route("/work-orders/:id", get(show).put(update).delete(delete))
}

/// GET /work-orders - `status` and `product_id` narrow the list
pub async fn list(State(services): State<Services>, ctx: RequestContext, query: StandardList) -> ApiResult<Vec<WorkOrderResponse>> {
    let criteria = WorkOrderCriteria {
        status: query.typed("status")?,
        product_id: query.parsed("product_id"),
    };
    let page = services.work_orders.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /work-orders - Schedule production
 *
 * Expected Input:
 * ```json
 * {
 *   "product_id": 1,
 *   "quantity": "100",            // Required, greater than zero
 *   "planned_start": "2024-06-01",
 *   "planned_end": "2024-06-10",  // Not before planned_start
 *   "remark": "string"
 * }
 * ```
 */
pub async fn create(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateWorkOrderRequest>,
) -> ApiResult<WorkOrderResponse> {
    let order = services.work_orders.create(&ctx, WorkOrderDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(order.into()).message("工单创建成功"))
}

pub async fn show(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<WorkOrderResponse> {
    Ok(ApiResponse::ok(services.work_orders.get(&ctx, id).await?.into()))
}

pub async fn update(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateWorkOrderRequest>,
) -> ApiResult<WorkOrderResponse> {
    let order = services.work_orders.update(&ctx, id, WorkOrderPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(order.into()).message("工单更新成功"))
}

pub async fn delete(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.work_orders.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("工单删除成功"))
}
