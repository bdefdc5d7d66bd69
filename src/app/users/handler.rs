//! 用户资源处理器

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use super::serializer::{to_representation, UserRepresentation};
use super::service::parse_id;
use crate::core::{
    error::CoreError,
    extract::{BaseUrl, Payload},
    response::{paginate, Listing},
};
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
}

/// GET /users/
pub async fn list_users(
    State(state): State<AppState>,
    base_url: BaseUrl,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<UserRepresentation>>, CoreError> {
    let users: Vec<UserRepresentation> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|user| to_representation(user, &base_url))
        .collect();

    let listing = match state.api.page_size {
        Some(page_size) => Listing::Paged(paginate(
            users,
            query.page.as_deref(),
            page_size,
            &base_url.join("/users/"),
        )?),
        None => Listing::All(users),
    };
    Ok(Json(listing))
}

/// GET /users/{id}/
pub async fn retrieve_user(
    State(state): State<AppState>,
    base_url: BaseUrl,
    Path(id): Path<String>,
) -> Result<Json<UserRepresentation>, CoreError> {
    let user = state.users.retrieve(parse_id(&id)?).await?;
    Ok(Json(to_representation(user, &base_url)))
}

/// POST /users/
pub async fn create_user(
    State(state): State<AppState>,
    base_url: BaseUrl,
    Payload(body): Payload,
) -> Result<impl IntoResponse, CoreError> {
    let user = state.users.create(&body).await?;
    let representation = to_representation(user, &base_url);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, representation.url.clone())],
        Json(representation),
    ))
}

/// PUT /users/{id}/
pub async fn update_user(
    State(state): State<AppState>,
    base_url: BaseUrl,
    Path(id): Path<String>,
    Payload(body): Payload,
) -> Result<Json<UserRepresentation>, CoreError> {
    let user = state.users.update(parse_id(&id)?, &body, false).await?;
    Ok(Json(to_representation(user, &base_url)))
}

/// PATCH /users/{id}/
pub async fn partial_update_user(
    State(state): State<AppState>,
    base_url: BaseUrl,
    Path(id): Path<String>,
    Payload(body): Payload,
) -> Result<Json<UserRepresentation>, CoreError> {
    let user = state.users.update(parse_id(&id)?, &body, true).await?;
    Ok(Json(to_representation(user, &base_url)))
}

/// DELETE /users/{id}/
pub async fn destroy_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
    state.users.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
