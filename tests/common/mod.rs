#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tower::ServiceExt;

use users_api::{
    app::users::store::MemoryUserStore,
    build_router,
    infrastructure::config::{AccountConfig, Config},
    AppState,
};

pub const HOST: &str = "testserver";

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.accounts = vec![
        AccountConfig {
            username: "admin".to_string(),
            password: "secret".to_string(),
            is_staff: true,
        },
        AccountConfig {
            username: "client".to_string(),
            password: "client-pass".to_string(),
            is_staff: false,
        },
    ];
    config
}

pub fn app_with(config: Config) -> Router {
    let state = AppState::new(Arc::new(MemoryUserStore::new()), &config).unwrap();
    build_router(state, &config.http)
}

pub fn app() -> Router {
    app_with(test_config())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth("admin", "secret"))
        .body(Body::empty())
        .unwrap()
}

pub fn admin_post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth("admin", "secret"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// 通过接口创建用户，返回响应体
pub async fn create_user(app: &Router, body: Value) -> Value {
    let response = send(app, json_request("POST", "/users/", &body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
