//! 管理后台处理器

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tera::Context;
use tracing::info;

use super::search::{matches, split_terms};
use crate::app::auth::middleware::AuthenticatedUser;
use crate::app::users::{
    choices::Sex,
    countries::Country,
    model::User,
    service::parse_id,
};
use crate::core::error::{CoreError, FieldErrors};
use crate::router::AppState;

const CHANGELIST_URL: &str = "/admin/users/";

/// 列表列
const LIST_DISPLAY: [&str; 5] = ["first_name", "last_name", "email", "sex", "age"];

/// 表单字段
const FORM_FIELDS: [&str; 6] = ["first_name", "last_name", "email", "age", "sex", "country"];

const TEXT_FIELDS: [(&str, &str); 4] = [
    ("first_name", "First name"),
    ("last_name", "Last name"),
    ("email", "Email"),
    ("age", "Age"),
];

const EMPTY_VALUE: &str = "-";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct Row {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    sex: String,
    age: String,
}

impl From<User> for Row {
    fn from(user: User) -> Self {
        let fields = user.fields;
        Self {
            id: user.id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email.unwrap_or_else(|| EMPTY_VALUE.to_string()),
            sex: fields
                .sex
                .map_or(EMPTY_VALUE, Sex::label)
                .to_string(),
            age: fields
                .age
                .map_or_else(|| EMPTY_VALUE.to_string(), |age| age.to_string()),
        }
    }
}

#[derive(Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
}

/// GET /admin/
pub async fn index(State(state): State<AppState>) -> Result<Response, CoreError> {
    let mut context = Context::new();
    context.insert("count", &state.users.list().await?.len());
    Ok(state.admin.render("index.html", &context)?.into_response())
}

/// GET /admin/users/?q=
pub async fn changelist(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, CoreError> {
    let users = state.users.list().await?;
    let total = users.len();
    let terms = split_terms(&query.q);
    let rows: Vec<Row> = users
        .into_iter()
        .filter(|user| matches(user, &terms))
        .map(Row::from)
        .collect();

    let mut context = Context::new();
    context.insert("columns", &LIST_DISPLAY);
    context.insert("count", &rows.len());
    context.insert("total", &total);
    context.insert("rows", &rows);
    context.insert("q", &query.q);
    Ok(state
        .admin
        .render("change_list.html", &context)?
        .into_response())
}

/// GET /admin/users/add/
pub async fn add_form(State(state): State<AppState>) -> Result<Response, CoreError> {
    render_form(&state, None, &HashMap::new(), &FieldErrors::new())
}

/// POST /admin/users/add/
pub async fn add_submit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, CoreError> {
    match state.users.create(&form_to_payload(&form)).await {
        Ok(user) => {
            info!("{} added user {} ({})", admin, user.display_name(), user.id);
            Ok(Redirect::to(CHANGELIST_URL).into_response())
        }
        Err(CoreError::Validation(errors)) => render_form(&state, None, &form, &errors),
        Err(err) => Err(err),
    }
}

/// GET /admin/users/{id}/change/
pub async fn change_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, CoreError> {
    let user = state.users.retrieve(parse_id(&id)?).await?;
    render_form(&state, Some(&user), &user_to_form(&user), &FieldErrors::new())
}

/// POST /admin/users/{id}/change/
pub async fn change_submit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, CoreError> {
    let id = parse_id(&id)?;
    match state.users.update(id, &form_to_payload(&form), false).await {
        Ok(user) => {
            info!("{} changed user {} ({})", admin, user.display_name(), user.id);
            Ok(Redirect::to(CHANGELIST_URL).into_response())
        }
        Err(CoreError::Validation(errors)) => {
            let user = state.users.retrieve(id).await?;
            render_form(&state, Some(&user), &form, &errors)
        }
        Err(err) => Err(err),
    }
}

/// GET /admin/users/{id}/delete/
pub async fn delete_confirmation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, CoreError> {
    let user = state.users.retrieve(parse_id(&id)?).await?;
    let mut context = Context::new();
    context.insert("user_id", &user.id);
    context.insert("name", &user.display_name());
    Ok(state
        .admin
        .render("delete_confirmation.html", &context)?
        .into_response())
}

/// POST /admin/users/{id}/delete/
pub async fn delete_submit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Response, CoreError> {
    let id = parse_id(&id)?;
    state.users.delete(id).await?;
    info!("{} deleted user {}", admin, id);
    Ok(Redirect::to(CHANGELIST_URL).into_response())
}

fn render_form(
    state: &AppState,
    user: Option<&User>,
    values: &HashMap<String, String>,
    errors: &FieldErrors,
) -> Result<Response, CoreError> {
    let (title, action) = match user {
        Some(user) => (
            format!("Change user: {}", user.display_name()),
            format!("/admin/users/{}/change/", user.id),
        ),
        None => ("Add user".to_string(), "/admin/users/add/".to_string()),
    };

    // 模板按字段名取值，所有键都需要存在
    let mut form_values = Map::new();
    let mut form_errors = Map::new();
    for name in FORM_FIELDS.iter().chain(["non_field_errors"].iter()) {
        form_values.insert(
            name.to_string(),
            Value::String(values.get(*name).cloned().unwrap_or_default()),
        );
        let messages = errors.get(name).map(<[String]>::to_vec).unwrap_or_default();
        form_errors.insert(name.to_string(), Value::from(messages));
    }

    let text_fields: Vec<Value> = TEXT_FIELDS
        .iter()
        .map(|(name, label)| serde_json::json!({ "name": name, "label": label }))
        .collect();
    let sex_choices: Vec<Choice> = Sex::choices()
        .map(|(value, label)| Choice { value, label })
        .collect();
    let countries: Vec<Choice> = Country::all()
        .into_iter()
        .map(|country| Choice {
            value: country.code(),
            label: country.name(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("title", &title);
    context.insert("action", &action);
    context.insert("user_id", &user.map(|user| user.id));
    context.insert("values", &form_values);
    context.insert("errors", &form_errors);
    context.insert("has_errors", &!errors.is_empty());
    context.insert("text_fields", &text_fields);
    context.insert("sex_choices", &sex_choices);
    context.insert("countries", &countries);
    Ok(state
        .admin
        .render("change_form.html", &context)?
        .into_response())
}

/// 表单中缺失的键不写入，由序列化器判断必填
fn form_to_payload(form: &HashMap<String, String>) -> Value {
    let object: Map<String, Value> = FORM_FIELDS
        .iter()
        .filter_map(|name| {
            form.get(*name)
                .map(|value| (name.to_string(), Value::String(value.clone())))
        })
        .collect();
    Value::Object(object)
}

fn user_to_form(user: &User) -> HashMap<String, String> {
    let fields = &user.fields;
    HashMap::from([
        ("first_name".to_string(), fields.first_name.clone()),
        ("last_name".to_string(), fields.last_name.clone()),
        ("email".to_string(), fields.email.clone().unwrap_or_default()),
        (
            "age".to_string(),
            fields.age.map(|age| age.to_string()).unwrap_or_default(),
        ),
        (
            "sex".to_string(),
            fields.sex.map(Sex::as_str).unwrap_or_default().to_string(),
        ),
        (
            "country".to_string(),
            fields.country.map(Country::code).unwrap_or_default().to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::users::serializer::{from_representation, WriteMode};

    #[test]
    fn form_round_trips_through_serializer() {
        let mut form = HashMap::new();
        form.insert("first_name".to_string(), "Ada".to_string());
        form.insert("last_name".to_string(), "Lovelace".to_string());
        form.insert("email".to_string(), "".to_string());
        form.insert("age".to_string(), "36".to_string());
        form.insert("sex".to_string(), "W".to_string());
        form.insert("country".to_string(), "GB".to_string());

        let fields = from_representation(&form_to_payload(&form), WriteMode::Full).unwrap();
        let user = User::new(1, fields);
        assert_eq!(user_to_form(&user), form);
    }

    #[test]
    fn rows_show_labels_and_placeholders() {
        let mut form = HashMap::new();
        form.insert("first_name".to_string(), "Ada".to_string());
        form.insert("last_name".to_string(), "Lovelace".to_string());
        form.insert("sex".to_string(), "P".to_string());
        let fields = from_representation(&form_to_payload(&form), WriteMode::Full).unwrap();

        let row = Row::from(User::new(1, fields));
        assert_eq!(row.sex, "Prefer not to say");
        assert_eq!(row.email, EMPTY_VALUE);
        assert_eq!(row.age, EMPTY_VALUE);
    }
}
