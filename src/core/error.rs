//! 核心错误处理模块

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::app::users::store::StoreError;

/// 按字段聚合的校验错误，序列化为 `{field: [message, ...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, field_errors) in err.field_errors() {
            for error in field_errors {
                let message = match (&*error.code, error.params.get("value")) {
                    ("invalid_choice", Some(value)) => {
                        format!("\"{}\" is not a valid choice.", value)
                    }
                    _ => error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| "Invalid value.".to_string()),
                };
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("unsupported media type")]
    UnsupportedMediaType,
    #[error("not found")]
    NotFound,
    #[error("invalid page")]
    InvalidPage,
    #[error("unable to log in with provided credentials")]
    AuthenticationFailed,
    #[error("authentication credentials were not provided")]
    NotAuthenticated,
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),
    #[error("template rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::Validation(errors)
    }
}

impl From<tera::Error> for CoreError {
    fn from(err: tera::Error) -> Self {
        CoreError::Render(err.to_string())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CoreError::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            CoreError::MalformedBody(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": format!("JSON parse error - {}", msg) }),
            ),
            CoreError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                json!({ "detail": "Unsupported media type in request." }),
            ),
            CoreError::NotFound => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
            CoreError::InvalidPage => {
                (StatusCode::NOT_FOUND, json!({ "detail": "Invalid page." }))
            }
            CoreError::AuthenticationFailed => (
                StatusCode::BAD_REQUEST,
                json!({
                    "non_field_errors": ["Unable to log in with provided credentials."]
                }),
            ),
            CoreError::NotAuthenticated => {
                return unauthorized("Authentication credentials were not provided.")
            }
            CoreError::InvalidToken(detail) => return unauthorized(detail),
            CoreError::Render(msg) => {
                error!("Template error: {}", msg);
                server_error()
            }
            CoreError::Store(err) => {
                error!("Store error: {}", err);
                server_error()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn unauthorized(detail: &str) -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
    response
}

fn server_error() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": "A server error occurred." }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("age", "first");
        errors.add("age", "second");
        errors.add("sex", "third");

        assert_eq!(errors.get("age").unwrap().len(), 2);
        assert_eq!(errors.get("sex").unwrap(), ["third".to_string()]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn not_authenticated_sets_challenge_header() {
        let response = CoreError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Token");
    }
}
