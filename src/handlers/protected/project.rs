// handlers/protected/project.rs - /api/v1/project/projects

use axum::{extract::State, routing::get, Router};

use crate::api::{ApiResponse, ApiResult, IdPath, ValidatedJson, WideList};
use crate::dto::project::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};
use crate::handlers::paginated;
use crate::services::project::{ProjectCriteria, ProjectDraft, ProjectPatch};
use crate::services::{CrudService, RequestContext, Services};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/:id", get(show).put(update).delete(delete))
}

/// GET /projects - `status` and `manager_id` narrow the list
pub async fn list(State(services): State<Services>, ctx: RequestContext, query: WideList) -> ApiResult<Vec<ProjectResponse>> {
    let criteria = ProjectCriteria {
        status: query.typed("status")?,
        manager_id: query.parsed("manager_id"),
    };
    let page = services.projects.list(&ctx, criteria, &query.paging).await?;
    Ok(paginated(page, &query.paging))
}

pub async fn create(
    State(services): State<Services>,
    ctx: RequestContext,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let project = services.projects.create(&ctx, ProjectDraft::try_from(request)?).await?;
    Ok(ApiResponse::created(project.into()).message("项目创建成功"))
}

pub async fn show(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<ProjectResponse> {
    Ok(ApiResponse::ok(services.projects.get(&ctx, id).await?.into()))
}

pub async fn update(
    State(services): State<Services>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let project = services.projects.update(&ctx, id, ProjectPatch::try_from(request)?).await?;
    Ok(ApiResponse::ok(project.into()).message("项目更新成功"))
}

pub async fn delete(State(services): State<Services>, ctx: RequestContext, IdPath(id): IdPath) -> ApiResult<()> {
    services.projects.delete(&ctx, id).await?;
    Ok(ApiResponse::ok(()).message("项目删除成功"))
}
