//! Authentication mode and the bearer token.
//!
//! # Design
//! `SessionController` owns the login/register mode, the error line shown on
//! the form, and the cookie store that holds the token. The cookie is the
//! only copy of the token: `token()` reads it every time, so an expired
//! cookie turns into "logged out" without any timer.

use std::cell::{Cell, RefCell};

use crate::client::{error_message, AuthEndpoint, Remote};
use crate::cookies::{session_max_age, CookieStore, AUTH_COOKIE};
use crate::error::SessionError;
use crate::http::Transport;
use crate::types::{AuthRequest, Credentials};

const MISSING_FIELDS: &str = "Please fill out all required fields.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const GENERIC_FAILURE: &str = "Something went wrong.";

/// Which form the auth view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Login,
    Register,
}

impl ViewMode {
    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Login => "Login",
            ViewMode::Register => "Register",
        }
    }

    /// The confirm-password field exists only on the register form.
    pub fn shows_confirm_password(&self) -> bool {
        matches!(self, ViewMode::Register)
    }

    fn endpoint(&self) -> AuthEndpoint {
        match self {
            ViewMode::Login => AuthEndpoint::Login,
            ViewMode::Register => AuthEndpoint::Register,
        }
    }
}

pub struct SessionController<C> {
    cookies: C,
    mode: Cell<ViewMode>,
    error: RefCell<Option<String>>,
}

impl<C: CookieStore> SessionController<C> {
    pub fn new(cookies: C) -> Self {
        Self {
            cookies,
            mode: Cell::new(ViewMode::Login),
            error: RefCell::new(None),
        }
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn mode(&self) -> ViewMode {
        self.mode.get()
    }

    /// The message currently displayed on the form, if any.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn switch_mode(&self, target: ViewMode) {
        self.mode.set(target);
        self.error.replace(None);
    }

    /// The stored bearer token. Missing, empty, and expired cookies all read
    /// as `None`.
    pub fn token(&self) -> Option<String> {
        self.cookies.get(AUTH_COOKIE).filter(|t| !t.is_empty())
    }

    /// Startup check: a stored token counts as logged in. It is not
    /// validated against the server.
    pub fn restore_session(&self) -> Option<String> {
        let token = self.token();
        if token.is_some() {
            tracing::info!("restored session from {AUTH_COOKIE} cookie");
        }
        token
    }

    /// Exchange credentials for a token using the current mode's endpoint.
    ///
    /// On success the token is written to the cookie store and returned. On
    /// failure the error's message becomes the form's error line.
    pub async fn authenticate<T: Transport>(
        &self,
        remote: &Remote<T>,
        credentials: &Credentials,
    ) -> Result<String, SessionError> {
        self.error.replace(None);
        let mode = self.mode();
        let action = mode.title().to_lowercase();
        match self.exchange(remote, mode, credentials).await {
            Ok(token) => {
                self.cookies.set(AUTH_COOKIE, &token, session_max_age());
                tracing::info!("{action} succeeded");
                Ok(token)
            }
            Err(err) => {
                tracing::warn!("{action} failed: {err:?}");
                self.error.replace(Some(err.to_string()));
                Err(err)
            }
        }
    }

    async fn exchange<T: Transport>(
        &self,
        remote: &Remote<T>,
        mode: ViewMode,
        credentials: &Credentials,
    ) -> Result<String, SessionError> {
        let input = validate(mode, credentials)?;
        let request = remote
            .api()
            .build_authenticate(mode.endpoint(), &input)
            .map_err(|e| SessionError::Auth(e.to_string()))?;
        let response = remote.send(request).await.map_err(SessionError::Network)?;

        // Any rejection, whatever its status, shows the body's `error`.
        if !response.is_success() {
            let message = error_message(&response.body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
            return Err(SessionError::Auth(message));
        }
        remote
            .api()
            .parse_authenticate(response)
            .map_err(|_| SessionError::Auth(GENERIC_FAILURE.to_string()))
    }

    /// Tell the server the token is done with, then forget it locally. The
    /// local teardown happens whatever the server says.
    pub async fn logout<T: Transport>(&self, remote: &Remote<T>) {
        if let Some(token) = self.token() {
            let request = remote.api().build_logout(&token);
            match remote.send(request).await {
                Ok(response) => {
                    if let Err(err) = remote.api().parse_logout(response) {
                        tracing::warn!("logout rejected: {err}");
                    }
                }
                Err(err) => tracing::warn!("logout request failed: {err}"),
            }
        }
        self.clear();
        tracing::info!("logged out");
    }

    /// Drop a token the server no longer accepts and explain why on the form.
    pub fn expire(&self, message: &str) {
        self.clear();
        self.error.replace(Some(message.to_string()));
    }

    fn clear(&self) {
        self.cookies.remove(AUTH_COOKIE);
        self.mode.set(ViewMode::Login);
        self.error.replace(None);
    }
}

/// Presence and match checks. Both fields are trimmed and the trimmed
/// values are what gets sent.
fn validate(mode: ViewMode, credentials: &Credentials) -> Result<AuthRequest, SessionError> {
    let email = credentials.email.trim();
    let password = credentials.password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SessionError::Validation(MISSING_FIELDS.to_string()));
    }
    if mode == ViewMode::Register {
        let confirm = credentials.confirm_password.as_deref().unwrap_or("").trim();
        if confirm != password {
            return Err(SessionError::Validation(PASSWORD_MISMATCH.to_string()));
        }
    }
    Ok(AuthRequest {
        username: email.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_fields() {
        for (email, password) in [("", "pw"), ("a@b.com", ""), ("   ", "pw"), ("a@b.com", "  ")] {
            let err = validate(ViewMode::Login, &Credentials::new(email, password)).unwrap_err();
            assert!(matches!(err, SessionError::Validation(ref m) if m == MISSING_FIELDS));
        }
    }

    #[test]
    fn validate_checks_confirmation_only_when_registering() {
        let creds = Credentials::new("a@b.com", "pw").with_confirmation("other");
        assert!(validate(ViewMode::Login, &creds).is_ok());
        let err = validate(ViewMode::Register, &creds).unwrap_err();
        assert_eq!(err.to_string(), PASSWORD_MISMATCH);
    }

    #[test]
    fn validate_register_without_confirmation_fails() {
        let err = validate(ViewMode::Register, &Credentials::new("a@b.com", "pw")).unwrap_err();
        assert_eq!(err.to_string(), PASSWORD_MISMATCH);
    }

    #[test]
    fn validate_sends_trimmed_values() {
        let creds = Credentials::new("  a@b.com ", " pw ").with_confirmation("pw");
        let input = validate(ViewMode::Register, &creds).unwrap();
        assert_eq!(input.username, "a@b.com");
        assert_eq!(input.password, "pw");
    }

    #[test]
    fn view_mode_drives_form_shape() {
        assert_eq!(ViewMode::default(), ViewMode::Login);
        assert!(!ViewMode::Login.shows_confirm_password());
        assert!(ViewMode::Register.shows_confirm_password());
        assert_eq!(ViewMode::Register.title(), "Register");
    }
}
