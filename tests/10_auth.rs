mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{assert_envelope, TestServer, PASSWORD};
use erp_api::auth::JwtKeys;
use erp_api::config::{AppConfig, Environment};
use reqwest::StatusCode;
use serde_json::json;

fn tamper(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("three-part token");
    let mut chars: Vec<char> = signature.chars().collect();
    chars[5] = if chars[5] == 'a' { 'b' } else { 'a' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}

#[tokio::test]
async fn register_login_and_me() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login_as("alice").await?;

    let (status, body) = server.get("/api/v1/auth/me", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_envelope(&body);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn login_response_shape() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.login_as("bob").await?;

    let (status, body) = server
        .post("/api/v1/auth/login", json!({ "username": "bob", "password": PASSWORD }), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "登录成功");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["expires_at"].is_string());
    assert_eq!(body["data"]["user"]["username"], "bob");
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.login_as("carol").await?;

    let (status, body) = server
        .post(
            "/api/v1/auth/register",
            json!({ "username": "carol", "email": "other@example.com", "password": PASSWORD }),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "用户名已存在");
    assert_envelope(&body);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.login_as("dave").await?;

    let (status, body) = server
        .post("/api/v1/auth/login", json!({ "username": "dave", "password": "Wrong1234" }), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "用户名或密码错误");

    let (status, body) = server
        .post("/api/v1/auth/login", json!({ "username": "nobody", "password": "Wrong1234" }), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "用户名或密码错误");
    Ok(())
}

#[tokio::test]
async fn register_reports_every_missing_field() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.post("/api/v1/auth/register", json!({}), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "参数验证失败");

    let fields = body["details"]["field_errors"].as_object().expect("field_errors");
    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["email", "password", "username"]);
    Ok(())
}

#[tokio::test]
async fn weak_password_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server
        .post(
            "/api/v1/auth/register",
            json!({ "username": "erin", "email": "erin@example.com", "password": "short" }),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.get("/api/v1/auth/me", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "未提供认证令牌");
    Ok(())
}

#[tokio::test]
async fn tampered_signature_is_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.token_for(1, "alice");

    let (status, body) = server.get("/api/v1/accounting/accounts", Some(&tamper(&token))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "message": "无效的认证令牌" }));
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;
    let issued = server.keys.issue_at(1, "alice", Utc::now() - Duration::hours(3))?;

    let (status, body) = server.get("/api/v1/accounting/accounts", Some(&issued.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "认证令牌已过期");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() -> Result<()> {
    let server = TestServer::spawn().await?;

    let mut config = AppConfig::defaults(Environment::Test);
    config.jwt.secret = "some-other-secret".to_string();
    let foreign = JwtKeys::from_config(&config.jwt)?.issue(1, "alice")?;

    let (status, body) = server.get("/api/v1/accounting/accounts", Some(&foreign.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "无效的认证令牌");
    Ok(())
}

#[tokio::test]
async fn same_token_resolves_to_same_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.login_as("frank").await?;

    let (_, first) = server.get("/api/v1/auth/me", Some(&token)).await?;
    let (_, second) = server.get("/api/v1/auth/me", Some(&token)).await?;
    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["username"], second["data"]["username"]);
    Ok(())
}

#[tokio::test]
async fn refresh_is_not_implemented_and_logout_succeeds() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.post("/api/v1/auth/refresh", json!({}), None).await?;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["message"], "令牌刷新功能暂未实现");

    let (status, body) = server.post("/api/v1/auth/logout", json!({}), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "登出成功");
    Ok(())
}
