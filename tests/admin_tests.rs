mod common;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
};
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_admin_requires_credentials() {
    let app = app();
    let request = Request::builder()
        .uri("/admin/")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"admin\""
    );
}

#[tokio::test]
async fn test_admin_rejects_non_staff_and_wrong_password() {
    let app = app();
    for (username, password) in [("client", "client-pass"), ("admin", "wrong")] {
        let request = Request::builder()
            .uri("/admin/users/")
            .header(header::AUTHORIZATION, basic_auth(username, password))
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_admin_index_counts_users() {
    let app = app();
    create_user(&app, json!({ "first_name": "Ada", "last_name": "Lovelace" })).await;

    let response = send(&app, admin_get("/admin/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Site administration"));
    assert!(html.contains("1 record"));
}

#[tokio::test]
async fn test_changelist_shows_labels_and_searches() {
    let app = app();
    create_user(
        &app,
        json!({ "first_name": "Marie", "last_name": "Curie", "sex": "W", "age": 66 }),
    )
    .await;
    create_user(&app, json!({ "first_name": "Albert", "last_name": "Einstein" })).await;

    let response = send(&app, admin_get("/admin/users/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Curie"));
    assert!(html.contains("Einstein"));
    assert!(html.contains("<td>Woman</td>"));
    assert!(html.find("Curie") < html.find("Einstein"));

    let response = send(&app, admin_get("/admin/users/?q=curie+66")).await;
    let html = body_text(response).await;
    assert!(html.contains("Curie"));
    assert!(!html.contains("Einstein"));
    assert!(html.contains("2 total"));
}

#[tokio::test]
async fn test_add_user_redirects_to_changelist() {
    let app = app();
    let response = send(&app, admin_get("/admin/users/add/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Add user"));

    let response = send(
        &app,
        admin_post(
            "/admin/users/add/",
            "first_name=Grace&last_name=Hopper&email=&age=85&sex=W&country=US",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/users/");

    let response = send(&app, get("/users/1/")).await;
    let user = body_json(response).await;
    assert_eq!(user["first_name"], "Grace");
    assert_eq!(user["email"], json!(null));
    assert_eq!(user["age"], 85);
    assert_eq!(user["country"], "US");
}

#[tokio::test]
async fn test_invalid_form_is_rendered_with_errors() {
    let app = app();
    let response = send(
        &app,
        admin_post("/admin/users/add/", "first_name=&last_name=Hopper&age=200"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Please correct the errors below."));
    assert!(html.contains("This field may not be blank."));
    assert!(html.contains("is not a valid choice."));
    assert!(html.contains("value=\"Hopper\""));

    let response = send(&app, get("/users/")).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_change_user_from_admin() {
    let app = app();
    create_user(
        &app,
        json!({ "first_name": "Ada", "last_name": "Lovelace", "country": "GB" }),
    )
    .await;

    let response = send(&app, admin_get("/admin/users/1/change/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("value=\"Lovelace\""));
    assert!(html.contains("<option value=\"GB\" selected>"));

    let response = send(
        &app,
        admin_post(
            "/admin/users/1/change/",
            "first_name=Ada&last_name=King&country=GB",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, get("/users/1/")).await;
    assert_eq!(body_json(response).await["last_name"], "King");
}

#[tokio::test]
async fn test_delete_user_from_admin() {
    let app = app();
    create_user(&app, json!({ "first_name": "Ada", "last_name": "Lovelace" })).await;

    let response = send(&app, admin_get("/admin/users/1/delete/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Are you sure?"));

    let response = send(&app, admin_post("/admin/users/1/delete/", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, get("/users/1/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_user_in_admin_is_not_found() {
    let app = app();
    let response = send(&app, admin_get("/admin/users/7/change/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cross_site_post_is_rejected() {
    let app = app();
    create_user(&app, json!({ "first_name": "Ada", "last_name": "Lovelace" })).await;

    let mut request = admin_post("/admin/users/1/delete/", "");
    request
        .headers_mut()
        .insert(header::HOST, HeaderValue::from_static(HOST));
    request
        .headers_mut()
        .insert(header::ORIGIN, HeaderValue::from_static("https://evil.example"));
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_text(response).await.contains("CSRF verification failed"));

    let response = send(&app, get("/users/1/")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_same_origin_post_is_accepted() {
    let app = app();
    create_user(&app, json!({ "first_name": "Ada", "last_name": "Lovelace" })).await;

    let mut request = admin_post("/admin/users/1/delete/", "");
    request
        .headers_mut()
        .insert(header::HOST, HeaderValue::from_static(HOST));
    request.headers_mut().insert(
        header::ORIGIN,
        HeaderValue::from_static("http://testserver"),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, get("/users/1/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
