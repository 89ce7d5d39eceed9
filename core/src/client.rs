//! Stateless HTTP request builder and response parser for the todo service.
//!
//! # Design
//! `ApiClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. `Remote` pairs the client with a host
//! `Transport` so the controllers can run a full round-trip in one call.

use serde::Serialize;

use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{AuthRequest, AuthResponse, CreateTodo, ErrorBody, Todo, UpdateTodo};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Which authentication endpoint a credential exchange targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    Register,
}

impl AuthEndpoint {
    fn path(&self) -> &'static str {
        match self {
            AuthEndpoint::Login => "login",
            AuthEndpoint::Register => "register",
        }
    }
}

/// Synchronous, stateless client for the todo service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_authenticate(
        &self,
        endpoint: AuthEndpoint,
        input: &AuthRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, endpoint.path(), None, input)
    }

    pub fn build_logout(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Post, "logout", Some(token))
    }

    pub fn build_list_todos(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "todos", Some(token))
    }

    pub fn build_create_todo(&self, token: &str, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "todos", Some(token), input)
    }

    pub fn build_update_todo(
        &self,
        token: &str,
        id: &str,
        input: &UpdateTodo,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("todos/{id}"), Some(token), input)
    }

    pub fn build_delete_todo(&self, token: &str, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("todos/{id}"), Some(token))
    }

    /// Parse a login/register response. Any 2xx carrying a `token` succeeds.
    pub fn parse_authenticate(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_success(&response)?;
        let body: AuthResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(body.token)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_success(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// The created todo in the body is not needed by the client; only the
    /// status is checked.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}/{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path, token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Extract the `error` field the service puts in non-2xx bodies.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        401 => Err(ApiError::Unauthorized(
            error_message(&response.body).unwrap_or_default(),
        )),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// An `ApiClient` bound to the host's transport.
#[derive(Debug, Clone)]
pub struct Remote<T> {
    api: ApiClient,
    transport: T,
}

impl<T: Transport> Remote<T> {
    pub fn new(api: ApiClient, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!("{} {}", request.method.as_str(), request.path);
        let response = self.transport.execute(request).await?;
        tracing::debug!("-> {}", response.status);
        Ok(response)
    }
}
