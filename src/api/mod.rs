pub mod envelope;
pub mod extract;
pub mod pagination;
pub mod validation;

pub use envelope::{ApiResponse, Envelope, Enveloped, GENERIC_SERVER_ERROR};
pub use extract::{CurrentUser, IdPath, ListQuery, StandardList, WideList};
pub use pagination::{Page, PageQuery, Pagination, DEFAULT_PAGE_SIZE, WIDE_PAGE_SIZE};
pub use validation::{RequestValidator, ValidatedJson, Violation};

/// Result type returned by every controller
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
