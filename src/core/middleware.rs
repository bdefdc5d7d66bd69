//! 核心中间件模块

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 请求日志中间件，同时为响应附加 `x-request-id`
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = Uuid::new_v4().to_string();

    let mut response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            "{} {} - {} - {}ms",
            method,
            uri,
            status,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            "{} {} - {} - {}ms",
            method,
            uri,
            status,
            duration.as_millis()
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }
    response
}

/// 跨站请求校验：非安全方法的 `Origin`（缺失时看 `Referer`）必须与 `Host` 一致
///
/// 两个头都没有的请求放行，浏览器发出的跨站表单总会带上 `Origin`。
pub async fn same_origin_guard(req: Request, next: Next) -> Response {
    if req.method().is_safe() || is_same_origin(req.headers()) {
        return next.run(req).await;
    }

    warn!("Rejected cross-site {} {}", req.method(), req.uri());
    (
        StatusCode::FORBIDDEN,
        Html("<h1>403 Forbidden</h1><p>CSRF verification failed. Request aborted.</p>"),
    )
        .into_response()
}

fn is_same_origin(headers: &HeaderMap) -> bool {
    let source = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .map(|value| value.to_str().ok().and_then(authority_of));
    let host = headers.get(header::HOST).and_then(|value| value.to_str().ok());

    match source {
        None => true,
        Some(Some(authority)) => host.is_some_and(|host| host.eq_ignore_ascii_case(authority)),
        Some(None) => false,
    }
}

/// `scheme://authority/path` 中的 authority
fn authority_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    (!authority.is_empty()).then_some(authority)
}
