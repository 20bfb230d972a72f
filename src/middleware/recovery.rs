use std::any::Any;
use std::backtrace::Backtrace;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request},
    http::{header::USER_AGENT, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::{error, warn};

use crate::api::envelope::Enveloped;
use crate::api::extract::REQUEST_ID_HEADER;
use crate::error::{ApiError, ErrorKind, ErrorReport};

/// Largest framework error body read back when re-rendering it
const BARE_BODY_LIMIT: usize = 16 * 1024;

/// Who made the request, captured before the handler consumes it
#[derive(Debug, Clone)]
struct RequestMeta {
    method: Method,
    path: String,
    client_ip: String,
    user_agent: String,
    request_id: String,
}

impl RequestMeta {
    fn capture(request: &Request) -> Self {
        let headers = request.headers();
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            client_ip: client_ip(headers, peer),
            user_agent: header_str(headers, USER_AGENT.as_str()).unwrap_or_default().to_string(),
            request_id: header_str(headers, REQUEST_ID_HEADER).unwrap_or_default().to_string(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer
fn client_ip(headers: &HeaderMap, peer: Option<String>) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| header_str(headers, "x-real-ip").map(str::to_string))
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Outermost error stage around the handlers.
///
/// * a panicking handler becomes a 500 envelope and the process keeps serving;
/// * every failed [`ApiError`] is logged once with the request metadata;
/// * bare error responses from the router (unknown route, wrong method,
///   oversized body) are re-rendered as envelopes.
pub async fn error_boundary(request: Request, next: Next) -> Response {
    let meta = RequestMeta::capture(&request);

    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                method = %meta.method,
                path = %meta.path,
                client_ip = %meta.client_ip,
                user_agent = %meta.user_agent,
                request_id = %meta.request_id,
                panic = %message,
                "handler panicked"
            );
            // Already logged above; skip the report so it is not logged twice
            let mut response = ApiError::panic(message).into_response();
            response.extensions_mut().remove::<Arc<ErrorReport>>();
            return response;
        }
    };

    if let Some(report) = response.extensions().get::<Arc<ErrorReport>>().cloned() {
        log_failure(&meta, &report);
        return response;
    }

    let status = response.status();
    if (status.is_client_error() || status.is_server_error()) && response.extensions().get::<Enveloped>().is_none() {
        return rerender(&meta, response).await;
    }

    response
}

fn log_failure(meta: &RequestMeta, report: &ErrorReport) {
    let details = report.details.as_ref().map(|d| d.to_string()).unwrap_or_default();
    let cause = report.cause.as_deref().unwrap_or_default();

    if report.kind.is_server_fault() {
        error!(
            method = %meta.method,
            path = %meta.path,
            client_ip = %meta.client_ip,
            user_agent = %meta.user_agent,
            request_id = %meta.request_id,
            kind = ?report.kind,
            code = %report.code,
            status = report.status.as_u16(),
            details = %details,
            cause = %cause,
            "{}",
            report.message
        );
    } else {
        warn!(
            method = %meta.method,
            path = %meta.path,
            client_ip = %meta.client_ip,
            user_agent = %meta.user_agent,
            request_id = %meta.request_id,
            kind = ?report.kind,
            code = %report.code,
            status = report.status.as_u16(),
            details = %details,
            cause = %cause,
            "{}",
            report.message
        );
    }
}

/// Turn a plain-text framework error into the envelope for the same status
async fn rerender(meta: &RequestMeta, response: Response) -> Response {
    let status = response.status();
    let body = to_bytes(response.into_body(), BARE_BODY_LIMIT).await.unwrap_or_default();
    let text = String::from_utf8_lossy(&body).trim().to_string();

    let api = match status {
        StatusCode::NOT_FOUND => ApiError::not_found("请求的资源不存在"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ApiError::new(ErrorKind::Validation, "METHOD_NOT_ALLOWED", "请求方法不被允许").with_status(status)
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::new(ErrorKind::Validation, "PAYLOAD_TOO_LARGE", "请求体过大").with_status(status)
        }
        StatusCode::UNAUTHORIZED => ApiError::unauthorized("未提供认证令牌"),
        StatusCode::FORBIDDEN => ApiError::forbidden("没有访问权限"),
        s if s.is_client_error() => {
            let api = ApiError::new(ErrorKind::Validation, "BAD_REQUEST", "请求参数错误").with_status(s);
            if text.is_empty() {
                api
            } else {
                api.with_error(text.clone())
            }
        }
        _ => ApiError::internal_server_error(anyhow::anyhow!("upstream returned {}: {}", status, text)),
    };

    let mut rendered = api.into_response();
    if let Some(report) = rendered.extensions().get::<Arc<ErrorReport>>().cloned() {
        log_failure(meta, &report);
    }
    rendered.extensions_mut().remove::<Arc<ErrorReport>>();
    rendered
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Route panic reports through `tracing`, with location and backtrace.
///
/// The boundary only sees the unwound payload, so the stack has to be
/// captured here at the panic site.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_message(info.payload());
        let backtrace = Backtrace::force_capture();
        error!(location = %location, backtrace = %backtrace, "panic: {}", payload);
    }));
}
