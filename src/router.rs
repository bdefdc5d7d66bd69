//! 路由与应用状态

use std::{sync::Arc, time::Duration};

use axum::{
    extract::FromRef,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{
    admin::{handler as admin, templates::AdminTemplates},
    auth::{
        handler::obtain_auth_token,
        middleware::{staff_basic_auth, token_auth},
        service::{AuthError, Authenticator},
    },
    users::{handler as users, service::UserService, store::UserStore},
};
use crate::core::{
    error::CoreError,
    extract::BaseUrl,
    middleware::{request_logging_middleware, same_origin_guard},
};
use crate::infrastructure::config::{ApiConfig, Config, HttpConfig};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("模板加载失败: {0}")]
    Templates(#[from] tera::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub auth: Arc<Authenticator>,
    pub api: Arc<ApiConfig>,
    pub admin: Arc<AdminTemplates>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: &Config) -> Result<Self, StateError> {
        Ok(Self {
            users: UserService::new(store),
            auth: Arc::new(Authenticator::from_config(&config.auth)?),
            api: Arc::new(config.api.clone()),
            admin: Arc::new(AdminTemplates::new()?),
        })
    }
}

impl FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.api.clone()
    }
}

impl FromRef<AppState> for Arc<Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    let api = Router::new()
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id/",
            get(users::retrieve_user)
                .put(users::update_user)
                .patch(users::partial_update_user)
                .delete(users::destroy_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            token_auth,
        ));

    let admin = Router::new()
        .route("/admin/", get(admin::index))
        .route("/admin/users/", get(admin::changelist))
        .route(
            "/admin/users/add/",
            get(admin::add_form).post(admin::add_submit),
        )
        .route(
            "/admin/users/:id/change/",
            get(admin::change_form).post(admin::change_submit),
        )
        .route(
            "/admin/users/:id/delete/",
            get(admin::delete_confirmation).post(admin::delete_submit),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            staff_basic_auth,
        ))
        .route_layer(middleware::from_fn(same_origin_guard));

    Router::new()
        .route("/", get(api_root))
        .route("/api-token-auth/", axum::routing::post(obtain_auth_token))
        .merge(api)
        .merge(admin)
        .fallback(not_found)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds)))
        .with_state(state)
}

/// GET /
async fn api_root(base_url: BaseUrl) -> Json<Value> {
    Json(json!({ "users": base_url.join("/users/") }))
}

async fn not_found() -> CoreError {
    CoreError::NotFound
}
