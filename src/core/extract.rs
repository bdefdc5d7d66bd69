//! 请求提取器

use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRef, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde_json::Value;

use super::error::CoreError;
use crate::infrastructure::config::ApiConfig;

/// JSON 请求体，解析失败映射为 [`CoreError`]
#[derive(Debug)]
pub struct Payload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(CoreError::UnsupportedMediaType),
            Err(rejection) => Err(CoreError::MalformedBody(rejection.body_text())),
        }
    }
}

/// 生成自链接用的绝对地址前缀，不带结尾斜杠
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BaseUrl
where
    Arc<ApiConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api = Arc::<ApiConfig>::from_ref(state);
        if let Some(url) = &api.public_url {
            return Ok(Self(url.trim_end_matches('/').to_string()));
        }

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        Ok(Self(format!("http://{}", host)))
    }
}
