//! 认证中间件
//!
//! API 使用 `Authorization: Token <key>`；管理后台使用 HTTP Basic，且只允许
//! staff 账户。

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use super::service::Authenticator;
use crate::core::error::CoreError;

/// 通过 HTTP Basic 认证的管理员账户名，写入请求扩展
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// 开启 `require_token` 时校验令牌
pub async fn token_auth(
    State(auth): State<Arc<Authenticator>>,
    req: Request,
    next: Next,
) -> Result<Response, CoreError> {
    if !auth.require_token() {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(CoreError::NotAuthenticated)?;
    let key = parse_token_header(header)?;

    let username = auth
        .authenticate_token(key)
        .await
        .ok_or(CoreError::InvalidToken("Invalid token."))?;
    debug!("Token accepted for {}", username);

    Ok(next.run(req).await)
}

/// 解析 `Token <key>`，关键字不区分大小写
fn parse_token_header(header: &str) -> Result<&str, CoreError> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(keyword), _, _) if !keyword.eq_ignore_ascii_case("token") => {
            Err(CoreError::NotAuthenticated)
        }
        (Some(_), None, _) => Err(CoreError::InvalidToken(
            "Invalid token header. No credentials provided.",
        )),
        (Some(_), Some(key), None) => Ok(key),
        (Some(_), Some(_), Some(_)) => Err(CoreError::InvalidToken(
            "Invalid token header. Token string should not contain spaces.",
        )),
        (None, _, _) => Err(CoreError::NotAuthenticated),
    }
}

/// 管理后台的 HTTP Basic 校验
pub async fn staff_basic_auth(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(decode_basic);

    let staff = match &credentials {
        Some((username, password)) => auth
            .check_credentials(username, password)
            .await
            .filter(|account| account.is_staff)
            .map(|account| account.username),
        None => None,
    };

    match staff {
        Some(username) => {
            req.extensions_mut().insert(AuthenticatedUser(username));
            next.run(req).await
        }
        None => {
            if let Some((username, _)) = credentials {
                warn!("Rejected admin login for {:?}", username);
            }
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Html("<h1>401 Unauthorized</h1><p>Staff credentials are required.</p>"),
            )
                .into_response();
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"admin\""),
            );
            response
        }
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
