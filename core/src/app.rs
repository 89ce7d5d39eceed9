//! The application context: one value that owns everything the UI needs.
//!
//! # Design
//! `App` wires the session controller to the todo controller and decides
//! which screen is up. Every operation takes `&self`; the host may start a
//! second operation while the first is still awaiting its response.
//!
//! Screen follows the token: a successful login/register or a restored
//! cookie switches to the list and triggers one refresh; logout, or a list
//! request the server answers with 401, switches back to the form.

use std::cell::Cell;

use crate::client::Remote;
use crate::cookies::CookieStore;
use crate::error::SessionError;
use crate::http::Transport;
use crate::session::{SessionController, ViewMode};
use crate::todos::{RefreshOutcome, TodoController, TodoDraft};
use crate::types::{Credentials, Todo};
use crate::view::{render_auth, render_todos, View};

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Todos,
}

pub struct App<T, C> {
    remote: Remote<T>,
    session: SessionController<C>,
    todos: TodoController,
    screen: Cell<Screen>,
}

impl<T: Transport, C: CookieStore> App<T, C> {
    pub fn new(remote: Remote<T>, cookies: C) -> Self {
        Self {
            remote,
            session: SessionController::new(cookies),
            todos: TodoController::new(),
            screen: Cell::new(Screen::Auth),
        }
    }

    pub fn remote(&self) -> &Remote<T> {
        &self.remote
    }

    pub fn session(&self) -> &SessionController<C> {
        &self.session
    }

    pub fn todos(&self) -> &TodoController {
        &self.todos
    }

    pub fn screen(&self) -> Screen {
        self.screen.get()
    }

    pub fn render(&self) -> View {
        match self.screen() {
            Screen::Auth => View::Auth(render_auth(self.session.mode(), self.session.error())),
            Screen::Todos => View::Todos(render_todos(
                &self.todos.items(),
                |id| self.todos.edit_state(id),
                self.todos.draft(),
            )),
        }
    }

    /// Run once at startup. Returns whether a stored session was found.
    pub async fn start(&self) -> bool {
        if self.session.restore_session().is_none() {
            self.screen.set(Screen::Auth);
            return false;
        }
        self.show_todos().await;
        true
    }

    pub fn switch_mode(&self, target: ViewMode) {
        self.session.switch_mode(target);
    }

    /// Submit the auth form in the current mode.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<(), SessionError> {
        self.session.authenticate(&self.remote, credentials).await?;
        self.show_todos().await;
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.logout(&self.remote).await;
        self.todos.reset();
        self.screen.set(Screen::Auth);
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.todos.refresh(&self.remote, self.token().as_deref()).await;
        self.settle(outcome)
    }

    pub fn set_draft(&self, draft: TodoDraft) {
        self.todos.set_draft(draft);
    }

    /// Submit the "new todo" form from the current draft.
    pub async fn create_from_draft(&self) -> Option<RefreshOutcome> {
        let draft = self.todos.draft();
        self.create(&draft.title, &draft.description).await
    }

    pub async fn create(&self, title: &str, description: &str) -> Option<RefreshOutcome> {
        let outcome = self
            .todos
            .create(&self.remote, self.token().as_deref(), title, description)
            .await?;
        Some(self.settle(outcome))
    }

    pub fn begin_edit(&self, id: &str) {
        self.todos.begin_edit(id);
    }

    pub async fn save_edit(&self, id: &str, title: &str, description: &str) -> RefreshOutcome {
        let outcome = self
            .todos
            .save_edit(&self.remote, self.token().as_deref(), id, title, description)
            .await;
        self.settle(outcome)
    }

    pub async fn toggle_complete(&self, id: &str, current: bool) -> RefreshOutcome {
        let outcome = self
            .todos
            .toggle_complete(&self.remote, self.token().as_deref(), id, current)
            .await;
        self.settle(outcome)
    }

    pub async fn delete(&self, id: &str) -> RefreshOutcome {
        let outcome = self
            .todos
            .delete(&self.remote, self.token().as_deref(), id)
            .await;
        self.settle(outcome)
    }

    /// Look up a listed todo by id.
    pub fn find(&self, id: &str) -> Option<Todo> {
        self.todos.items().into_iter().find(|t| t.id == id)
    }

    fn token(&self) -> Option<String> {
        self.session.token()
    }

    async fn show_todos(&self) {
        self.screen.set(Screen::Todos);
        self.refresh().await;
    }

    fn settle(&self, outcome: RefreshOutcome) -> RefreshOutcome {
        if self.screen() != Screen::Todos {
            return outcome;
        }
        match outcome {
            RefreshOutcome::Unauthorized => {
                tracing::info!("token rejected, returning to login");
                self.session.expire(SESSION_EXPIRED);
            }
            // The cookie expired (or was removed) while the list was up.
            RefreshOutcome::Skipped => self.session.expire(SESSION_EXPIRED),
            _ => return outcome,
        }
        self.todos.reset();
        self.screen.set(Screen::Auth);
        outcome
    }
}
