use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use url::form_urlencoded;

use super::pagination::{PageQuery, DEFAULT_PAGE_SIZE, WIDE_PAGE_SIZE};
use crate::auth::Principal;
use crate::error::ApiError;
use crate::services::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Positive numeric `:id` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub u64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("无效的ID"))?;

        match raw.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(IdPath(id)),
            _ => Err(ApiError::bad_request("无效的ID")),
        }
    }
}

/// Principal attached by the auth gate; rejects when the route was reached without one
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("未提供认证令牌"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let principal = parts.extensions.get::<Principal>().cloned();
        Ok(RequestContext::new(request_id, principal))
    }
}

/// Raw query string parameters with the list defaults resolved.
///
/// `PAGE_SIZE` is the endpoint family's default page size; resource-specific
/// filters are read from [`ListQuery::param`].
#[derive(Debug, Clone)]
pub struct ListQuery<const PAGE_SIZE: u32> {
    pub paging: PageQuery,
    params: HashMap<String, String>,
}

impl<const PAGE_SIZE: u32> ListQuery<PAGE_SIZE> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Parsed parameter; malformed values are treated as absent
    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.param(name).and_then(|v| v.parse().ok())
    }

    /// Enumerated filter; unlike [`ListQuery::parsed`] an unknown value is an error
    pub fn typed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, T::Err> {
        self.param(name).map(str::parse).transpose()
    }
}

/// List query for most endpoint families
pub type StandardList = ListQuery<DEFAULT_PAGE_SIZE>;
/// List query for people and project listings
pub type WideList = ListQuery<WIDE_PAGE_SIZE>;

#[async_trait]
impl<S: Send + Sync, const PAGE_SIZE: u32> FromRequestParts<S> for ListQuery<PAGE_SIZE> {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Lossy decoding: a malformed escape degrades that value, never the request
        let params: HashMap<String, String> = parts
            .uri
            .query()
            .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Ok(Self {
            paging: PageQuery::parse(&params, PAGE_SIZE),
            params,
        })
    }
}
