// handlers/protected/sales.rs - /api/v1/sales customers and orders

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, StandardList, ValidatedJson};
use crate::dto::sales::{
    CreateCustomerRequest, CreateSalesOrderRequest, CustomerResponse, SalesOrderResponse, UpdateCustomerRequest,
    UpdateSalesOrderRequest,
};
use crate::handlers::paginated;
use crate::services::sales::{CustomerDraft, CustomerPatch, SalesOrderCriteria, SalesOrderDraft, SalesOrderPatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).put(update_order).delete(delete_order))
}

pub async fn list_customers(
    State(services): State<Services>,
    ctx: RequestContext,
    query: StandardList,
) -> ApiResult<Vec<CustomerResponse>> {
    let page = services.customers.list(&ctx, (), &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn create_customer(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateCustomerRequest>,
) -> ApiResult<CustomerResponse> {
    let customer = services.customers.create(&ctx, CustomerDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(customer.into()).message("客户创建成功"))
}

pub async fn get_customer(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<CustomerResponse> {
    Ok(ApiResponse::ok(services.customers.get(&ctx, id).await?.into()))
}

pub async fn update_customer(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateCustomerRequest>,
) -> ApiResult<CustomerResponse> {
    let customer = services.customers.update(&ctx, id, CustomerPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(customer.into()).message("客户更新成功"))
}

pub async fn delete_customer(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.customers.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("客户删除成功"))
}

/// GET /orders - `customer_id` and `status` narrow the list
pub async fn list_orders(
    State(services): State<Services>,
    ctx: RequestContext,
    query: StandardList,
) -> ApiResult<Vec<SalesOrderResponse>> {
    let criteria = SalesOrderCriteria {
        customer_id: query.parsed("customer_id"),
        status: query.typed("status")?,
    };
    let page = services.sales_orders.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /orders - Place a sales order
 *
 * Expected Input:
 * ```json
 * {
 *   "customer_id": 1,
 *   "order_date": "2024-05-01",
 *   "items": [
 *     { "product_id": 3, "quantity": "2", "unit_price": "9.90" }
 *   ],
 *   "remark": "string"
 * }
 * ```
 *
 * `unit_price` falls back to the product's catalogue price; the total is computed.
 */
pub async fn create_order(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateSalesOrderRequest>,
) -> ApiResult<SalesOrderResponse> {
    let order = services.sales_orders.create_order(&ctx, SalesOrderDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(order.into()).message("订单创建成功"))
}

pub async fn get_order(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<SalesOrderResponse> {
    Ok(ApiResponse::ok(services.sales_orders.get(&ctx, id).await?.into()))
}

pub async fn update_order(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateSalesOrderRequest>,
) -> ApiResult<SalesOrderResponse> {
    let order = services.sales_orders.update(&ctx, id, SalesOrderPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(order.into()).message("订单更新成功"))
}

pub async fn delete_order(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.sales_orders.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("订单删除成功"))
}
