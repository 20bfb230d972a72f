// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (bearer token checked by the auth gate).
// Every handler returns `ApiResult<T>`, so success and failure both leave as
// the uniform envelope.

pub mod protected;
pub mod public;

use serde::Serialize;

use crate::api::{ApiResponse, Page, PageQuery};

/// Map a collaborator page to response DTOs with its pagination descriptor
pub(crate) fn paginated<M, R>(page: Page<M>, query: &PageQuery) -> ApiResponse<Vec<R>>
where
    R: From<M> + Serialize,
{
    let meta = query.pagination(page.total);
    ApiResponse::paginated(page.map(R::from).items, meta)
}
