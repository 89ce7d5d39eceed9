//! The todo list and its per-row edit state.
//!
//! # Design
//! The controller keeps an ephemeral copy of the server's list and never
//! patches it locally: every mutation ends with a `refresh` that replaces the
//! list wholesale and drops all edit state. Mutation failures are logged and
//! otherwise ignored; whatever the trailing refresh returns is the truth.
//!
//! State sits in `RefCell`s and no borrow is held across an await, so two
//! operations may be in flight on the same thread. Their trailing refreshes
//! race and the last response to land wins, except that `reset` bumps a
//! generation counter and a list fetched before the bump is dropped.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::client::{ApiClient, Remote};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Whether a row's fields are editable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing,
}

/// Contents of the "new todo" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
}

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No token; nothing was requested.
    Skipped,
    /// The list was replaced with this many items.
    Updated(usize),
    /// The server rejected the token.
    Unauthorized,
    /// The request failed; the list is unchanged.
    Failed,
    /// The controller was reset while the request was in flight; the
    /// response belonged to the old session and was dropped.
    Discarded,
}

#[derive(Debug, Default)]
pub struct TodoController {
    items: RefCell<Vec<Todo>>,
    edit_state: RefCell<HashMap<String, EditState>>,
    draft: RefCell<TodoDraft>,
    generation: Cell<u64>,
}

impl TodoController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<Todo> {
        self.items.borrow().clone()
    }

    pub fn edit_state(&self, id: &str) -> EditState {
        self.edit_state.borrow().get(id).copied().unwrap_or_default()
    }

    pub fn draft(&self) -> TodoDraft {
        self.draft.borrow().clone()
    }

    pub fn set_draft(&self, draft: TodoDraft) {
        self.draft.replace(draft);
    }

    /// Forget everything, e.g. after logout.
    pub fn reset(&self) {
        self.items.borrow_mut().clear();
        self.edit_state.borrow_mut().clear();
        self.draft.replace(TodoDraft::default());
        self.generation.set(self.generation.get() + 1);
    }

    /// Re-fetch the list. Without a token this does nothing.
    pub async fn refresh<T: Transport>(&self, remote: &Remote<T>, token: Option<&str>) -> RefreshOutcome {
        self.load(remote, token, self.generation.get()).await
    }

    /// Fetch the list on behalf of an operation that started in `generation`.
    async fn load<T: Transport>(&self, remote: &Remote<T>, token: Option<&str>, generation: u64) -> RefreshOutcome {
        let Some(token) = token else {
            return RefreshOutcome::Skipped;
        };
        let request = remote.api().build_list_todos(token);
        let sent = remote.send(request).await;
        if self.generation.get() != generation {
            tracing::debug!("dropping todo list fetched before reset");
            return RefreshOutcome::Discarded;
        }
        let result = match sent {
            Ok(response) => remote.api().parse_list_todos(response),
            Err(err) => {
                tracing::warn!("refresh failed: {err}");
                return RefreshOutcome::Failed;
            }
        };
        match result {
            Ok(todos) => {
                let count = todos.len();
                self.items.replace(todos);
                self.edit_state.borrow_mut().clear();
                tracing::debug!("loaded {count} todos");
                RefreshOutcome::Updated(count)
            }
            Err(ApiError::Unauthorized(msg)) => {
                tracing::warn!("refresh unauthorized: {msg}");
                RefreshOutcome::Unauthorized
            }
            Err(err) => {
                tracing::warn!("refresh failed: {err}");
                RefreshOutcome::Failed
            }
        }
    }

    /// Add a todo. Blank title or description aborts silently. Otherwise the
    /// draft is cleared and the list refreshed whatever the server answered.
    pub async fn create<T: Transport>(
        &self,
        remote: &Remote<T>,
        token: Option<&str>,
        title: &str,
        description: &str,
    ) -> Option<RefreshOutcome> {
        let (title, description) = (title.trim(), description.trim());
        if title.is_empty() || description.is_empty() {
            return None;
        }
        let generation = self.generation.get();
        let input = CreateTodo {
            title: title.to_string(),
            description: description.to_string(),
        };
        if let Some(token) = token {
            let request = remote.api().build_create_todo(token, &input);
            self.mutate(remote, "create", request, |api, r| api.parse_create_todo(r))
                .await;
        }
        self.draft.replace(TodoDraft::default());
        Some(self.load(remote, token, generation).await)
    }

    /// Make one row editable. Local only.
    pub fn begin_edit(&self, id: &str) {
        self.edit_state
            .borrow_mut()
            .insert(id.to_string(), EditState::Editing);
    }

    /// Send the edited fields, return the row to viewing, and refresh.
    pub async fn save_edit<T: Transport>(
        &self,
        remote: &Remote<T>,
        token: Option<&str>,
        id: &str,
        title: &str,
        description: &str,
    ) -> RefreshOutcome {
        let generation = self.generation.get();
        let input = UpdateTodo {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            completed: None,
        };
        if let Some(token) = token {
            let request = remote.api().build_update_todo(token, id, &input);
            self.mutate(remote, "update", request, |api, r| api.parse_update_todo(r))
                .await;
        }
        self.edit_state.borrow_mut().remove(id);
        self.load(remote, token, generation).await
    }

    /// Flip `completed`, then refresh.
    pub async fn toggle_complete<T: Transport>(
        &self,
        remote: &Remote<T>,
        token: Option<&str>,
        id: &str,
        current: bool,
    ) -> RefreshOutcome {
        let generation = self.generation.get();
        let input = UpdateTodo {
            completed: Some(!current),
            ..Default::default()
        };
        if let Some(token) = token {
            let request = remote.api().build_update_todo(token, id, &input);
            self.mutate(remote, "toggle", request, |api, r| api.parse_update_todo(r))
                .await;
        }
        self.load(remote, token, generation).await
    }

    pub async fn delete<T: Transport>(&self, remote: &Remote<T>, token: Option<&str>, id: &str) -> RefreshOutcome {
        let generation = self.generation.get();
        if let Some(token) = token {
            let request = Ok(remote.api().build_delete_todo(token, id));
            self.mutate(remote, "delete", request, |api, r| api.parse_delete_todo(r))
                .await;
        }
        self.load(remote, token, generation).await
    }

    /// Run one mutation round-trip. Every failure is logged and dropped.
    async fn mutate<T, F>(
        &self,
        remote: &Remote<T>,
        what: &str,
        request: Result<HttpRequest, ApiError>,
        parse: F,
    ) where
        T: Transport,
        F: FnOnce(&ApiClient, HttpResponse) -> Result<(), ApiError>,
    {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("{what} not sent: {err}");
                return;
            }
        };
        match remote.send(request).await {
            Ok(response) => {
                if let Err(err) = parse(remote.api(), response) {
                    tracing::warn!("{what} rejected: {err}");
                }
            }
            Err(err) => tracing::warn!("{what} failed: {err}"),
        }
    }
}
