//! Declarative view model.
//!
//! Rendering is a pure function of controller state; the host redraws the
//! whole screen from a `View` after every operation.

use crate::session::ViewMode;
use crate::todos::{EditState, TodoDraft};
use crate::types::Todo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Auth(AuthView),
    Todos(TodoListView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthView {
    pub mode: ViewMode,
    pub title: &'static str,
    pub show_confirm_password: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListView {
    pub draft: TodoDraft,
    pub rows: Vec<TodoRow>,
}

/// One rendered list entry. Exactly one of `show_edit`/`show_save` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub editable: bool,
    pub show_edit: bool,
    pub show_save: bool,
    pub toggle_label: &'static str,
}

pub fn render_auth(mode: ViewMode, error: Option<String>) -> AuthView {
    AuthView {
        mode,
        title: mode.title(),
        show_confirm_password: mode.shows_confirm_password(),
        error,
    }
}

pub fn render_todos(
    items: &[Todo],
    edit_state: impl Fn(&str) -> EditState,
    draft: TodoDraft,
) -> TodoListView {
    let rows = items
        .iter()
        .map(|todo| {
            let editing = edit_state(&todo.id) == EditState::Editing;
            TodoRow {
                id: todo.id.clone(),
                title: todo.title.clone(),
                description: todo.description.clone(),
                completed: todo.completed,
                editable: editing,
                show_edit: !editing,
                show_save: editing,
                toggle_label: if todo.completed { "Mark Pending" } else { "Mark Done" },
            }
        })
        .collect();
    TodoListView { draft, rows }
}
