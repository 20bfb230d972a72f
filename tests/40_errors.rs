mod common;

use anyhow::Result;
use common::{assert_envelope, TestServer};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["message"], "ERP API is running");
    assert_eq!(body["data"]["database"], "disabled");
    assert_eq!(body["data"]["environment"], "test");
    Ok(())
}

#[tokio::test]
async fn unknown_route_needs_a_token_then_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, _) = server.get("/api/v1/nowhere", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = server.get("/api/v1/nowhere", Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "请求的资源不存在");
    assert_envelope(&body);
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_enveloped() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.get("/api/v1/auth/login", None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "请求方法不被允许");
    Ok(())
}

#[tokio::test]
async fn undecodable_query_string_still_lists() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .get("/api/v1/purchase/suppliers?keyword=%FF&page=3", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_envelope(&body);
    assert_eq!(body["meta"]["page"], 3);
    assert_eq!(body["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let response = server
        .client()
        .post(format!("{}/api/v1/accounting/accounts", server.base_url))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"code\": ")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_field_type_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server
        .post(
            "/api/v1/accounting/accounts",
            json!({ "code": 1001, "name": "库存现金", "account_type": "asset" }),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "请求参数格式错误");
    assert_envelope(&body);
    Ok(())
}

#[tokio::test]
async fn every_response_keeps_data_and_error_apart() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");
    let auth = Some(token.as_str());

    let calls: Vec<(Method, &str, Option<Value>, Option<&str>)> = vec![
        (Method::GET, "/health", None, None),
        (Method::GET, "/api/v1/accounting/accounts", None, auth),
        (Method::GET, "/api/v1/accounting/accounts", None, None),
        (Method::GET, "/api/v1/accounting/accounts/5", None, auth),
        (Method::POST, "/api/v1/accounting/accounts", Some(json!({})), auth),
        (Method::POST, "/api/v1/auth/refresh", Some(json!({})), None),
        (Method::DELETE, "/api/v1/inventory/warehouses/1", None, auth),
        (Method::GET, "/api/v1/hr/departments", None, auth),
    ];

    for (method, path, body, token) in calls {
        let (status, body) = server.send(method.clone(), path, body, token).await?;
        assert_envelope(&body);
        assert_eq!(body["success"], status.is_success(), "{} {} -> {}", method, path, status);
    }
    Ok(())
}
