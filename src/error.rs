// HTTP API error types and classification
//
// Every failure that reaches the HTTP boundary ends up as an `ApiError`. Typed
// errors convert through the `From` impls below; opaque `anyhow::Error`s go
// through `classify`, which tries each known shape in a fixed order.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

use crate::api::envelope::{envelope_response, Envelope, GENERIC_SERVER_ERROR};
use crate::api::validation::{RequestValidator, Violation};
use crate::auth::AuthError;
use crate::database::models::ParseEnumError;
use crate::database::{Sentinel, StoreError};
use crate::services::ServiceError;

/// Error taxonomy shared by classification, rendering and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Permission,
    NotFound,
    Conflict,
    Business,
    Database,
    System,
    External,
}

impl ErrorKind {
    pub fn default_status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::Business => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Permission => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Database | ErrorKind::System | ErrorKind::External => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failures caused by the server rather than the request; logged at error level
    pub fn is_server_fault(&self) -> bool {
        matches!(self, ErrorKind::Database | ErrorKind::System | ErrorKind::External)
    }
}

/// Classified HTTP API error
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    code: Cow<'static, str>,
    status: StatusCode,
    message: String,
    /// Supplementary client-visible text (raw bind errors, detail strings)
    error: Option<String>,
    details: Option<Map<String, Value>>,
    cause: Option<anyhow::Error>,
}

/// What the error boundary needs to log a rendered failure
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub code: String,
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
    pub cause: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            status: kind.default_status(),
            message: message.into(),
            error: None,
            details: None,
            cause: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    /// Build the failure envelope this error renders as
    pub fn to_envelope(&self) -> Envelope<()> {
        // Server faults never echo their own message, whatever the constructor put there
        let message = if self.kind.is_server_fault() && self.status == StatusCode::INTERNAL_SERVER_ERROR {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.message.clone()
        };
        let error = if self.kind.is_server_fault() { None } else { self.error.clone() };
        Envelope::failure(message, error, self.details.clone().map(Value::Object))
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind,
            code: self.code.to_string(),
            status: self.status,
            message: self.message.clone(),
            details: self.details.clone().map(Value::Object),
            cause: self.cause.as_ref().map(|c| format!("{:#}", c)),
        }
    }

    /// Copy without the cause, for classifying by reference
    fn detached(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code.clone(),
            status: self.status,
            message: self.message.clone(),
            error: self.error.clone(),
            details: self.details.clone(),
            cause: None,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, "BAD_REQUEST", message)
    }

    /// Field violations collected by the validator
    pub fn validation(violations: Vec<Violation>) -> Self {
        let mut field_errors = Map::new();
        for violation in &violations {
            // First message per field wins; the full list is kept alongside
            field_errors
                .entry(violation.field.clone())
                .or_insert_with(|| Value::String(violation.message.clone()));
        }
        let mut details = Map::new();
        details.insert("field_errors".to_string(), Value::Object(field_errors));
        details.insert("violations".to_string(), json!(violations));

        Self::new(ErrorKind::Validation, "VALIDATION_ERROR", "参数验证失败").with_details(details)
    }

    /// Request body/query/path could not be bound; the raw text goes to the client
    pub fn bind_error(raw: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, "BIND_ERROR", "请求参数格式错误").with_error(raw)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, "CONFLICT", message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Business, "BUSINESS_RULE", message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, "NOT_IMPLEMENTED", message).with_status(StatusCode::NOT_IMPLEMENTED)
    }

    pub fn internal_server_error(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorKind::System, "INTERNAL_SERVER_ERROR", GENERIC_SERVER_ERROR).with_cause(cause)
    }

    pub fn database(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorKind::Database, "DATABASE_ERROR", GENERIC_SERVER_ERROR).with_cause(cause)
    }

    pub fn external(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorKind::External, "EXTERNAL_ERROR", GENERIC_SERVER_ERROR).with_cause(cause)
    }

    /// A handler panicked; `message` is the panic payload, kept for the logs only
    pub fn panic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, "PANIC", GENERIC_SERVER_ERROR).with_cause(anyhow::anyhow!(message.into()))
    }
}

/// Result of classifying an error value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub status: StatusCode,
}

/// Classify without consuming the error; same input always gives the same answer
pub fn classify(err: &anyhow::Error) -> Classification {
    let classified = classify_ref(err);
    Classification {
        kind: classified.kind,
        status: classified.status,
    }
}

fn classify_ref(err: &anyhow::Error) -> ApiError {
    // 1. Pre-tagged application errors
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.detached();
    }

    // 2. Structured validation errors
    if let Some(errors) = err.downcast_ref::<ValidationErrors>() {
        return ApiError::from_validation_errors(errors);
    }

    // Typed collaborator errors carry their own mapping
    if let Some(service) = err.downcast_ref::<ServiceError>() {
        return service_error(service);
    }

    // 3. Persistence sentinels
    if let Some(store) = err.downcast_ref::<StoreError>() {
        return store_error(store);
    }
    if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
        return sentinel_error(crate::database::sqlx_sentinel(sqlx_err));
    }

    // 4. Binding/unmarshalling failures
    if let Some(json_err) = err.downcast_ref::<serde_json::Error>() {
        return ApiError::bind_error(json_err.to_string());
    }
    let text = format!("{:#}", err);
    if looks_like_bind_error(&text) {
        return ApiError::bind_error(text);
    }

    // 5. Everything else
    ApiError::new(ErrorKind::System, "INTERNAL_SERVER_ERROR", GENERIC_SERVER_ERROR)
}

/// Loose text heuristic for decoding failures that arrive untyped
pub fn looks_like_bind_error(text: &str) -> bool {
    const MARKERS: [&str; 9] = [
        "failed to deserialize",
        "failed to parse",
        "unmarshal",
        "missing field",
        "invalid type",
        "unknown field",
        "unknown variant",
        "eof while parsing",
        "json",
    ];
    let lower = text.to_lowercase();
    MARKERS.iter().any(|marker| lower.contains(marker))
}

impl ApiError {
    fn from_validation_errors(errors: &ValidationErrors) -> Self {
        ApiError::validation(RequestValidator::default().violations(errors))
    }
}

fn sentinel_error(sentinel: Option<Sentinel>) -> ApiError {
    match sentinel {
        Some(Sentinel::RecordNotFound) => ApiError::not_found("记录不存在"),
        Some(Sentinel::MissingWhereClause) => {
            ApiError::new(ErrorKind::Validation, "MISSING_WHERE_CLAUSE", "缺少查询条件")
        }
        Some(Sentinel::InvalidValue) => ApiError::new(ErrorKind::Validation, "INVALID_VALUE", "数据格式错误"),
        Some(Sentinel::InvalidTransaction) => {
            ApiError::new(ErrorKind::Database, "INVALID_TRANSACTION", GENERIC_SERVER_ERROR)
        }
        None => ApiError::new(ErrorKind::Database, "DATABASE_ERROR", GENERIC_SERVER_ERROR),
    }
}

fn store_error(err: &StoreError) -> ApiError {
    sentinel_error(err.sentinel())
}

fn service_error(err: &ServiceError) -> ApiError {
    match err {
        ServiceError::NotFound { entity, .. } => ApiError::not_found(format!("{}不存在", entity.label())),
        ServiceError::Conflict(message) => ApiError::conflict(message.clone()),
        ServiceError::Business(message) => ApiError::business(message.clone()),
        ServiceError::Unauthorized(message) => ApiError::unauthorized(message.clone()),
        ServiceError::Forbidden(message) => ApiError::forbidden(message.clone()),
        ServiceError::PasswordHash(_) => ApiError::new(ErrorKind::System, "INTERNAL_SERVER_ERROR", GENERIC_SERVER_ERROR),
        ServiceError::Store(store) => store_error(store),
    }
}

// Convert other error types to ApiError
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(err) => classify_ref(&err).with_cause(err),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let api = service_error(&err);
        match err {
            // Carry the driver error along for the logs
            ServiceError::Store(store) => api.with_cause(store),
            ServiceError::PasswordHash(err) => api.with_cause(anyhow::anyhow!("password hashing failed: {}", err)),
            _ => api,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        store_error(&err).with_cause(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::from_validation_errors(&errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenGeneration(_) | AuthError::InvalidConfig(_) => ApiError::internal_server_error(err),
            _ => ApiError::unauthorized(err.client_message()).with_cause(err),
        }
    }
}

impl From<ParseEnumError> for ApiError {
    fn from(err: ParseEnumError) -> Self {
        let details = field_errors([(err.kind, "取值不在允许范围内")]);
        ApiError::new(ErrorKind::Validation, "INVALID_ENUM", "参数验证失败")
            .with_details(details)
            .with_error(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::new(ErrorKind::Validation, "PAYLOAD_TOO_LARGE", "请求体过大")
                .with_status(StatusCode::PAYLOAD_TOO_LARGE);
        }
        ApiError::bind_error(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bind_error(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| &**c as &(dyn std::error::Error + 'static))
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = envelope_response(self.status, &self.to_envelope());
        response.extensions_mut().insert(Arc::new(self.report()));
        response
    }
}

/// `field → message` map, handy for hand-built validation failures
pub fn field_errors<I, K, V>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let sorted: BTreeMap<String, String> = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    sorted.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}
