use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Todo};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

/// Send one request through a fresh clone of the router.
async fn send(app: &axum::Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn register(app: &axum::Router, username: &str, password: &str) -> String {
    let body = format!(r#"{{"username":"{username}","password":"{password}"}}"#);
    let resp = send(app, json_request("POST", "/register", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json: Value = body_json(resp).await;
    json["token"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn register_returns_token() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn register_duplicate_user_returns_409_with_error() {
    let app = app();
    register(&app, "a@b.com", "pw").await;
    let resp = send(
        &app,
        json_request("POST", "/register", None, r#"{"username":"a@b.com","password":"pw"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json: Value = body_json(resp).await;
    assert_eq!(json["error"], "User already exists");
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = app();
    register(&app, "a@b.com", "pw").await;
    let resp = send(
        &app,
        json_request("POST", "/login", None, r#"{"username":"a@b.com","password":"nope"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = body_json(resp).await;
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_issues_fresh_token() {
    let app = app();
    let first = register(&app, "a@b.com", "pw").await;
    let resp = send(
        &app,
        json_request("POST", "/login", None, r#"{"username":"a@b.com","password":"pw"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = body_json(resp).await;
    assert_ne!(json["token"].as_str().unwrap(), first);
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;

    let resp = send(&app, bearer_request("POST", "/logout", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, bearer_request("GET", "/todos", &token)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn todos_require_bearer_token() {
    let app = app();
    let resp = send(
        &app,
        Request::builder().uri("/todos").body(String::new()).unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, bearer_request("GET", "/todos", "bogus")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = body_json(resp).await;
    assert_eq!(json["error"], "Invalid token");
}

// --- todos ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;
    let resp = send(&app, bearer_request("GET", "/todos", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_todo_missing_description_returns_422() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;
    let resp = send(
        &app,
        json_request("POST", "/todos", Some(&token), r#"{"title":"x"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn todos_are_scoped_per_user() {
    let app = app();
    let alice = register(&app, "alice", "pw").await;
    let bob = register(&app, "bob", "pw").await;

    let resp = send(
        &app,
        json_request("POST", "/todos", Some(&alice), r#"{"title":"A","description":"a"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, bearer_request("GET", "/todos", &bob)).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn update_todo_not_found() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;
    let resp = send(
        &app,
        json_request("PUT", "/todos/missing", Some(&token), r#"{"title":"Nope"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;
    let resp = send(&app, bearer_request("DELETE", "/todos/missing", &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = app();
    let token = register(&app, "a@b.com", "pw").await;

    // create two, order must be kept
    let resp = send(
        &app,
        json_request("POST", "/todos", Some(&token), r#"{"title":"Walk dog","description":"park"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    assert!(!created.completed);
    let id = created.id;

    send(
        &app,
        json_request("POST", "/todos", Some(&token), r#"{"title":"Feed cat","description":"tuna"}"#),
    )
    .await;

    let resp = send(&app, bearer_request("GET", "/todos", &token)).await;
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Walk dog", "Feed cat"]);

    // update, partial: only completed
    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{id}"), Some(&token), r#"{"completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);

    // update, partial: title and description
    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todos/{id}"),
            Some(&token),
            r#"{"title":"Walk cat","description":"garden"}"#,
        ),
    )
    .await;
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.description, "garden");
    assert!(updated.completed); // unchanged from previous update

    // delete
    let resp = send(&app, bearer_request("DELETE", &format!("/todos/{id}"), &token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete, only the second remains
    let resp = send(&app, bearer_request("GET", "/todos", &token)).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Feed cat");
}
