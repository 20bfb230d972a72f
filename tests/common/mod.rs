#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use erp_api::auth::JwtKeys;
use erp_api::config::{AppConfig, Environment};
use erp_api::{router, AppState};

pub const PASSWORD: &str = "Passw0rd!";

/// A server on a free local port with its own in-memory state
pub struct TestServer {
    pub base_url: String,
    pub keys: Arc<JwtKeys>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::defaults(Environment::Test)).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        let state = AppState::new(config, None)?;
        let keys = state.keys.clone();
        let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            keys,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Sign a token directly, bypassing registration
    pub fn token_for(&self, user_id: u64, username: &str) -> String {
        self.keys.issue(user_id, username).expect("token").token
    }

    /// Register `username` and log in, returning the bearer token
    pub async fn login_as(&self, username: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                json!({ "username": username, "email": format!("{}@example.com", username), "password": PASSWORD }),
                None,
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);

        let (status, body) = self
            .post("/api/v1/auth/login", json!({ "username": username, "password": PASSWORD }), None)
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);

        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.context("request failed")?;
        let status = response.status();
        let body = response.json::<Value>().await.context("response body was not JSON")?;
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, None, token).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(body), token).await
    }

    pub async fn put(&self, path: &str, body: Value, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(body), token).await
    }

    pub async fn patch(&self, path: &str, body: Value, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, None, token).await
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Success envelopes never carry `error`; failures never carry `data`
pub fn assert_envelope(body: &Value) {
    match body["success"].as_bool() {
        Some(true) => assert!(body.get("error").is_none(), "success with error: {}", body),
        Some(false) => {
            assert!(body.get("data").is_none(), "failure with data: {}", body);
            assert!(body["message"].is_string(), "failure without message: {}", body);
        }
        None => panic!("not an envelope: {}", body),
    }
}

/// Decimal fields may serialize as strings or numbers
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal: {}", other),
    }
}
