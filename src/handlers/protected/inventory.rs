// handlers/protected/inventory.rs - /api/v1/inventory products and warehouses

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::inventory::{
    CreateProductRequest, CreateWarehouseRequest, ProductResponse, UpdateProductRequest, UpdateWarehouseRequest,
    WarehouseResponse,
};
use crate::handlers::paginated;
use crate::services::inventory::{ProductCriteria, ProductDraft, ProductPatch, WarehouseDraft, WarehousePatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/warehouses", get(list_warehouses).post(create_warehouse))
        .route(
            "/warehouses/:id",
            get(get_warehouse).put(update_warehouse).delete(delete_warehouse),
        )
}

/// GET /products - `category` narrows the list
pub async fn list_products(
    State(services): State<Services>,
    ctx: RequestContext,
    query: StandardList,
) -> ApiResult<Vec<ProductResponse>> {
    let criteria = ProductCriteria {
        category: query.param("category").map(str::to_string),
    };
    let page = services.products.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /products - Add a catalogue item
 *
 * Expected Input:
 * ```json
 * {
 *   "sku": "P-001",          // Required, unique
 *   "name": "string",        // Required
 *   "category": "string",    // Optional
 *   "unit": "个",            // Required
 *   "unit_price": "12.50",   // Required, not negative
 *   "description": "string"  // Optional
 * }
 * ```
 */
pub async fn create_product(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> ApiResult<ProductResponse> {
    let product = services.products.create(&ctx, ProductDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(product.into()).message("产品创建成功"))
}

pub async fn get_product(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<ProductResponse> {
    Ok(ApiResponse::ok(services.products.get(&ctx, id).await?.into()))
}

pub async fn update_product(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    let product = services.products.update(&ctx, id, ProductPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(product.into()).message("产品更新成功"))
}

pub async fn delete_product(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.products.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("产品删除成功"))
}

/// GET /warehouses
pub async fn list_warehouses(
    State(services): State<Services>,
    ctx: RequestContext,
    query: StandardList,
) -> ApiResult<Vec<WarehouseResponse>> {
    let page = services.warehouses.list(&ctx, (), &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn create_warehouse(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateWarehouseRequest>,
) -> ApiResult<WarehouseResponse> {
    let warehouse = services.warehouses.create(&ctx, WarehouseDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(warehouse.into()).message("仓库创建成功"))
}

pub async fn get_warehouse(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<WarehouseResponse> {
    Ok(ApiResponse::ok(services.warehouses.get(&ctx, id).await?.into()))
}

pub async fn update_warehouse(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateWarehouseRequest>,
) -> ApiResult<WarehouseResponse> {
    let warehouse = services.warehouses.update(&ctx, id, WarehousePatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(warehouse.into()).message("仓库更新成功"))
}

pub async fn delete_warehouse(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.warehouses.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("仓库删除成功"))
}
