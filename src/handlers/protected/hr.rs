// handlers/protected/hr.rs - /api/v1/hr departments and employees
//
// People listings page by 20 rather than 10.

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, ValidatedJson, WideList};
use crate::dto::hr::{
    CreateDepartmentRequest, CreateEmployeeRequest, DepartmentResponse, EmployeeResponse, UpdateDepartmentRequest,
    UpdateEmployeeRequest,
};
use crate::handlers::paginated;
use crate::services::hr::{DepartmentDraft, DepartmentPatch, EmployeeCriteria, EmployeeDraft, EmployeePatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/:id",
            get(get_department).put(update_department).delete(delete_department),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

pub async fn list_departments(
    State(services): State<Services>,
    ctx: RequestContext,
    query: WideList,
) -> ApiResult<Vec<DepartmentResponse>> {
    let page = services.departments.list(&ctx, (), &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn create_department(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateDepartmentRequest>,
) -> ApiResult<DepartmentResponse> {
    let department = services.departments.create(&ctx, DepartmentDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(department.into()).message("部门创建成功"))
}

pub async fn get_department(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> ApiResult<DepartmentResponse> {
    Ok(ApiResponse::ok(services.departments.get(&ctx, id).await?.into()))
}

pub async fn update_department(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateDepartmentRequest>,
) -> ApiResult<DepartmentResponse> {
    let department = services.departments.update(&ctx, id, DepartmentPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(department.into()).message("部门更新成功"))
}

pub async fn delete_department(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.departments.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("部门删除成功"))
}

/// GET /employees - `department_id` narrows the list
pub async fn list_employees(
    State(services): State<Services>,
    ctx: RequestContext,
    query: WideList,
) -> ApiResult<Vec<EmployeeResponse>> {
    let criteria = EmployeeCriteria {
        department_id: query.parsed("department_id"),
    };
    let page = services.employees.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

/**
 * POST /employees - Onboard an employee
 *
 * Expected Input:
 * ```json
 * {
 *   "employee_no": "E001",              // Required, unique
 *   "name": "张三",                      // Required
 *   "id_card": "11010519491231002X",    // Required, 18-character resident ID
 *   "phone": "13800138000",             // Required
 *   "email": "string",                  // Optional
 *   "department_id": 1,                 // Optional
 *   "position": "string",               // Optional
 *   "hire_date": "2023-09-01"           // Required
 * }
 * ```
 */
pub async fn create_employee(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateEmployeeRequest>,
) -> ApiResult<EmployeeResponse> {
    let employee = services.employees.create(&ctx, EmployeeDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(employee.into()).message("员工创建成功"))
}

pub async fn get_employee(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<EmployeeResponse> {
    Ok(ApiResponse::ok(services.employees.get(&ctx, id).await?.into()))
}

pub async fn update_employee(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateEmployeeRequest>,
) -> ApiResult<EmployeeResponse> {
    let employee = services.employees.update(&ctx, id, EmployeePatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(employee.into()).message("员工更新成功"))
}

pub async fn delete_employee(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.employees.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("员工删除成功"))
}
