// handlers/protected/purchase.rs - /api/v1/purchase/suppliers

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::purchase::{CreateSupplierRequest, SupplierResponse, UpdateSupplierRequest};
use crate::handlers::paginated;
use crate::services::purchase::{SupplierDraft, SupplierPatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list).post(create))
        .route("/suppliers/:id", get(show).put(update).delete(delete))
}

pub async fn list(State(services): State<Services>, ctx: RequestContext, query: StandardList) -> ApiResult<Vec<SupplierResponse>> {
    let page = services.suppliers.list(&ctx, (), &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn create(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateSupplierRequest>,
) -> ApiResult<SupplierResponse> {
    let supplier = services.suppliers.create(&ctx, SupplierDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(supplier.into()).message("供应商创建成功"))
}

pub async fn show(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<SupplierResponse> {
    Ok(ApiResponse::ok(services.suppliers.get(&ctx, id).await?.into()))
}

pub async fn update(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateSupplierRequest>,
) -> ApiResult<SupplierResponse> {
    let supplier = services.suppliers.update(&ctx, id, SupplierPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(supplier.into()).message("供应商更新成功"))
}

pub async fn delete(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.suppliers.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("供应商删除成功"))
}
