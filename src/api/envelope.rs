use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use super::pagination::Pagination;

/// Message returned for every server-side failure
pub const GENERIC_SERVER_ERROR: &str = "服务器内部错误";

/// Uniform JSON body of every response.
///
/// Fields are private: the only way to build one is through [`Envelope::success`]
/// or [`Envelope::failure`], so a failed envelope can never carry `data` and a
/// successful one can never carry `error`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = Value> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: Option<String>, meta: Option<Pagination>) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            error: None,
            details: None,
            meta,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error,
            details,
            meta: None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Response extension marking a body that is already an [`Envelope`]
#[derive(Debug, Clone, Copy)]
pub struct Enveloped;

/// An envelope paired with its HTTP status
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub envelope: Envelope<T>,
    pub status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`
    pub fn ok(data: T) -> Self {
        Self::with_status(Envelope::success(data, None, None), StatusCode::OK)
    }

    /// 201 with the created resource
    pub fn created(data: T) -> Self {
        Self::with_status(Envelope::success(data, None, None), StatusCode::CREATED)
    }

    pub fn with_status(envelope: Envelope<T>, status: StatusCode) -> Self {
        Self { envelope, status }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 with a page of items and the pagination descriptor in `meta`
    pub fn paginated(items: Vec<T>, pagination: Pagination) -> Self {
        Self::with_status(Envelope::success(items, None, Some(pagination)), StatusCode::OK)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // Serialize up front so a bad payload still yields an envelope
        let body = match serde_json::to_value(&self.envelope) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return envelope_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &Envelope::<()>::failure(GENERIC_SERVER_ERROR, None, None),
                );
            }
        };

        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(Enveloped);
        response
    }
}

/// Render an envelope with `status`, tagged as [`Enveloped`]
pub fn envelope_response<T: Serialize>(status: StatusCode, envelope: &Envelope<T>) -> Response {
    let mut response = (status, Json(envelope)).into_response();
    response.extensions_mut().insert(Enveloped);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;

    fn body<T: Serialize>(response: &ApiResponse<T>) -> Value {
        serde_json::to_value(&response.envelope).unwrap()
    }

    #[test]
    fn ok_has_data_and_no_error() {
        let response = ApiResponse::ok(json!({"id": 1})).message("done");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body(&response), json!({"success": true, "message": "done", "data": {"id": 1}}));
    }

    #[test]
    fn created_uses_201() {
        assert_eq!(ApiResponse::created(1).status, StatusCode::CREATED);
    }

    #[test]
    fn paginated_carries_meta() {
        let response = ApiResponse::paginated(vec![1, 2], Pagination::new(1, 10, 2));
        let value = body(&response);
        assert_eq!(value["meta"], json!({"page": 1, "page_size": 10, "total": 2, "total_pages": 1}));
        assert_eq!(value["data"], json!([1, 2]));
    }

    #[test]
    fn failures_never_carry_data() {
        for err in [
            ApiError::bad_request("bad").with_error("detail"),
            ApiError::unauthorized("no"),
            ApiError::forbidden("no"),
            ApiError::not_found("missing"),
            ApiError::conflict("dup"),
            ApiError::not_implemented("later"),
            ApiError::internal_server_error(anyhow::anyhow!("boom")),
        ] {
            let value = serde_json::to_value(err.to_envelope()).unwrap();
            assert_eq!(value["success"], false);
            assert!(value.get("data").is_none());
            assert!(!value["message"].as_str().unwrap().is_empty());
        }
    }

    #[test]
    fn failure_statuses() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::not_implemented("x").status_code(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn internal_error_is_generic() {
        let err = ApiError::internal_server_error(anyhow::anyhow!("connection reset by peer"));
        let value = serde_json::to_value(err.to_envelope()).unwrap();
        assert_eq!(value["message"], GENERIC_SERVER_ERROR);
        assert!(value.get("error").is_none());
    }
}
