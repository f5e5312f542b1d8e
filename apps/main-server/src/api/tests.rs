use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use task_store::MemoryTaskStore;
use tower::ServiceExt;

use crate::config::Config;
use crate::{create_app, create_state};

fn test_app() -> Router {
    let config = Config::new("test-secret-key-must-be-long-enough-for-security");
    create_app(create_state(config, MemoryTaskStore::new()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

struct TestUser {
    id: String,
    email: String,
    token: String,
}

async fn register(app: &Router, name: &str, email: &str) -> TestUser {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    TestUser {
        id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        token: body["data"]["token"].as_str().unwrap().to_string(),
    }
}

async fn create_project(app: &Router, owner: &TestUser) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/projects",
        Some(&owner.token),
        Some(json!({ "name": "Capstone", "description": "Final year project" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn add_member(app: &Router, owner: &TestUser, project_id: &str, email: &str, role: &str) {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/projects/{}/members", project_id),
        Some(&owner.token),
        Some(json!({ "email": email, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn create_task(app: &Router, user: &TestUser, project_id: &str, title: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/tasks",
        Some(&user.token),
        Some(json!({ "project": project_id, "title": title })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ADA@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], ada.id.as_str());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_invalid_bodies_are_validation_errors() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "not-an-email", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1", "admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/projects", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_creator_owns_project() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let eve = register(&app, "Eve", "eve@example.com").await;
    let project_id = create_project(&app, &ada).await;

    let (status, body) = send(&app, "GET", "/api/projects", Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["owner"]["id"], ada.id.as_str());
    assert_eq!(body["data"][0]["members"][0]["role"], "owner");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}", project_id),
        Some(&eve.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (_, body) = send(&app, "GET", "/api/projects", Some(&eve.token), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_member_management() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let project_id = create_project(&app, &ada).await;

    add_member(&app, &ada, &project_id, &bob.email, "member").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/members", project_id),
        Some(&ada.token),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "already_member");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/members", project_id),
        Some(&ada.token),
        Some(json!({ "email": "ghost@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "user_not_found");

    // Members cannot manage the team.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}/members/{}", project_id, ada.id),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}/members/{}", project_id, ada.id),
        Some(&ada.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "last_owner_violation");
    assert_eq!(body["message"], "Cannot remove the last owner from the project");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}/members/{}", project_id, ada.id),
        Some(&ada.token),
        Some(json!({ "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "last_owner_violation");
    assert_eq!(body["message"], "Cannot change role of the last owner");

    // Promote Bob, after which Ada may step down.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}/members/{}", project_id, bob.id),
        Some(&ada.token),
        Some(json!({ "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}/members/{}", project_id, ada.id),
        Some(&ada.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["owner"]["id"], bob.id.as_str());

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}/members/{}", project_id, ada.id),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_a_member");
}

#[tokio::test]
async fn test_member_permissions_on_tasks() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;
    let project_id = create_project(&app, &ada).await;
    add_member(&app, &ada, &project_id, &bob.email, "member").await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}", project_id),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = create_task(&app, &ada, &project_id, "Owner task").await;
    assert_eq!(status, StatusCode::CREATED);
    let owner_task = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = create_task(&app, &bob, &project_id, "Member task").await;
    assert_eq!(status, StatusCode::CREATED);
    let member_task = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/tasks/{}", owner_task),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/tasks/{}", member_task),
        Some(&bob.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", owner_task),
        Some(&bob.token),
        Some(json!({ "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_viewer_is_read_only() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let vic = register(&app, "Vic", "vic@example.com").await;
    let project_id = create_project(&app, &ada).await;
    add_member(&app, &ada, &project_id, &vic.email, "viewer").await;
    create_task(&app, &ada, &project_id, "Write report").await;

    let (status, body) = create_task(&app, &vic, &project_id, "Sneaky task").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/project/{}", project_id),
        Some(&vic.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}", project_id),
        Some(&vic.token),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_project_cascades() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let project_id = create_project(&app, &ada).await;

    let (_, body) = create_task(&app, &ada, &project_id, "One").await;
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    create_task(&app, &ada, &project_id, "Two").await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}", project_id),
        Some(&ada.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_tasks"], 2);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/{}", task_id),
        Some(&ada.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn test_completed_at_is_set_once() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let project_id = create_project(&app, &ada).await;
    let (_, body) = create_task(&app, &ada, &project_id, "Write report").await;
    let uri = format!("/api/tasks/{}", body["data"]["id"].as_str().unwrap());
    assert!(body["data"]["completed_at"].is_null());

    let (_, body) = send(&app, "PUT", &uri, Some(&ada.token), Some(json!({ "status": "completed" }))).await;
    let completed_at = body["data"]["completed_at"].clone();
    assert!(completed_at.is_string());

    let (_, body) = send(&app, "PUT", &uri, Some(&ada.token), Some(json!({ "status": "in-progress" }))).await;
    assert_eq!(body["data"]["completed_at"], completed_at);

    let (_, body) = send(&app, "PUT", &uri, Some(&ada.token), Some(json!({ "status": "completed" }))).await;
    assert_eq!(body["data"]["completed_at"], completed_at);
}

#[tokio::test]
async fn test_assignee_must_be_member() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let eve = register(&app, "Eve", "eve@example.com").await;
    let project_id = create_project(&app, &ada).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&ada.token),
        Some(json!({ "project": project_id, "title": "Review", "assignee_id": eve.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&ada.token),
        Some(json!({ "project": project_id, "title": "Review", "assignee_id": ada.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", "/api/tasks/my-tasks", Some(&ada.token), None).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_unknown_ids() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(&app, "GET", "/api/projects/not-a-uuid", Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}", uuid::Uuid::new_v4()),
        Some(&ada.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");
}

#[tokio::test]
async fn test_preferences() {
    let app = test_app();
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(&app, "GET", "/api/preferences/ada@example.com", Some(&ada.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/preferences/ada@example.com",
        Some(&ada.token),
        Some(json!({ "theme": "dark" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"], "dark");

    let (status, body) = send(&app, "GET", "/api/preferences/ada@example.com", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"], "dark");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/preferences/ada@example.com",
        Some(&bob.token),
        Some(json!({ "theme": "light" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/preferences/ghost@example.com",
        Some(&bob.token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "user_not_found");
}
