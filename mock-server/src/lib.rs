use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Users, live tokens, and each user's todos in insertion order.
#[derive(Default)]
pub struct Store {
    users: HashMap<String, String>,
    sessions: HashMap<String, String>,
    todos: HashMap<String, Vec<Todo>>,
}

impl Store {
    fn issue_token(&mut self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), username.to_string());
        token
    }
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "error": message })))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/todos", post(create_todo).get(list_todos))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The user a valid `Authorization: Bearer <token>` header belongs to.
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

impl FromRequestParts<Db> for AuthUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Missing token"))?;
        let store = db.read().await;
        let username = store
            .sessions
            .get(token)
            .cloned()
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid token"))?;
        Ok(AuthUser {
            username,
            token: token.to_string(),
        })
    }
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Username and password are required"));
    }
    let mut store = db.write().await;
    if store.users.contains_key(&input.username) {
        return Err(failure(StatusCode::CONFLICT, "User already exists"));
    }
    store.users.insert(input.username.clone(), input.password);
    let token = store.issue_token(&input.username);
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    if store.users.get(&input.username) != Some(&input.password) {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let token = store.issue_token(&input.username);
    Ok(Json(json!({ "token": token })))
}

async fn logout(State(db): State<Db>, user: AuthUser) -> Json<Value> {
    db.write().await.sessions.remove(&user.token);
    Json(json!({ "message": "Logged out" }))
}

async fn list_todos(State(db): State<Db>, user: AuthUser) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos.get(&user.username).cloned().unwrap_or_default())
}

async fn create_todo(
    State(db): State<Db>,
    user: AuthUser,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        completed: false,
    };
    db.write()
        .await
        .todos
        .entry(user.username)
        .or_default()
        .push(todo.clone());
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, Failure> {
    let mut store = db.write().await;
    let todo = store
        .todos
        .get_mut(&user.username)
        .and_then(|todos| todos.iter_mut().find(|t| t.id == id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Todo not found"))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    let todos = store.todos.entry(user.username).or_default();
    let before = todos.len();
    todos.retain(|t| t.id != id);
    if todos.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "Todo not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
