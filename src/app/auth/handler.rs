//! 令牌签发处理器

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::core::error::{CoreError, FieldErrors};
use crate::router::AppState;

#[derive(Debug, Default, Deserialize)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api-token-auth/，接受 JSON 或表单
pub async fn obtain_auth_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenResponse>, CoreError> {
    let credentials = parse_credentials(&headers, &body)?;

    let mut errors = FieldErrors::new();
    let username = required(credentials.username, "username", &mut errors);
    let password = required(credentials.password, "password", &mut errors);
    errors.into_result()?;

    state
        .auth
        .obtain_token(&username, &password)
        .await
        .map(|token| Json(TokenResponse { token }))
        .ok_or(CoreError::AuthenticationFailed)
}

fn parse_credentials(headers: &HeaderMap, body: &[u8]) -> Result<Credentials, CoreError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        serde_json::from_slice(body).map_err(|e| CoreError::MalformedBody(e.to_string()))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        serde_urlencoded::from_bytes(body).map_err(|e| CoreError::MalformedBody(e.to_string()))
    } else if body.is_empty() {
        Ok(Credentials::default())
    } else {
        Err(CoreError::UnsupportedMediaType)
    }
}

fn required(value: Option<String>, field: &str, errors: &mut FieldErrors) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        Some(_) => {
            errors.add(field, "This field may not be blank.");
            String::new()
        }
        None => {
            errors.add(field, "This field is required.");
            String::new()
        }
    }
}
