//! Client core for a cookie-session todo service.
//!
//! # Overview
//! Logs a user in (or registers them), keeps the bearer token in a cookie,
//! and drives a todo list through create/read/update/delete/toggle calls.
//! The core never touches the network or the screen: it builds
//! `HttpRequest` values, hands them to a host `Transport`, parses the
//! `HttpResponse` values that come back, and renders a `View` the host draws.
//!
//! # Design
//! - `ApiClient` is stateless: `build_*` produces a request, `parse_*`
//!   consumes a response.
//! - `SessionController` owns the login/register mode and the token cookie.
//! - `TodoController` owns the list and per-row edit state.
//! - `App` is the explicit context object tying them together; there are no
//!   process-wide singletons.

pub mod app;
pub mod client;
pub mod cookies;
pub mod error;
pub mod http;
pub mod session;
pub mod todos;
pub mod types;
pub mod view;

pub use app::{App, Screen};
pub use client::{ApiClient, AuthEndpoint, Remote, DEFAULT_BASE_URL};
pub use cookies::{Cookie, CookieStore, MemoryCookieJar, AUTH_COOKIE};
pub use error::{ApiError, SessionError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use session::{SessionController, ViewMode};
pub use todos::{EditState, RefreshOutcome, TodoController, TodoDraft};
pub use types::{AuthRequest, CreateTodo, Credentials, Todo, UpdateTodo};
pub use view::{AuthView, TodoListView, TodoRow, View};
