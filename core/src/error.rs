//! Error types for the todo client.
//!
//! # Design
//! Three layers. `TransportError` means no response arrived. `ApiError` is
//! what a `parse_*` method returns when a response arrived but was not the
//! expected one; `Unauthorized` and `NotFound` get dedicated variants because
//! callers branch on them. `SessionError` is the user-facing taxonomy of the
//! authentication form: every variant's `Display` is the inline message shown
//! to the user.

use thiserror::Error;

/// The request could not complete; no response was received.
#[derive(Debug, Clone, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Errors returned by `ApiClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401: the bearer token is missing, stale, or revoked.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 401 and 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Failures of the login/register flow, shown inline on the form.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status or an unusable body.
    #[error("{0}")]
    Auth(String),

    /// The request never completed.
    #[error("Network error. Try again.")]
    Network(#[source] TransportError),
}
