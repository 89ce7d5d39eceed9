//! Client-side cookie storage.
//!
//! # Design
//! The session token lives in a single cookie. `CookieStore` is the
//! key/value-with-expiry seam; the host decides where cookies physically live
//! (memory, a file, a browser jar). Expiry is never checked actively: an
//! expired cookie simply reads as absent. Removal writes the cookie again
//! with an expiry in the past, the way a browser deletes one.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Name of the cookie holding the bearer token.
pub const AUTH_COOKIE: &str = "authToken";

/// Lifetime of the auth cookie.
pub fn session_max_age() -> Duration {
    Duration::days(1)
}

/// Key/value storage with expiry, used for the session token.
///
/// Methods take `&self`; implementations use interior mutability because the
/// store is shared by the single UI thread.
pub trait CookieStore {
    /// The decoded value, or `None` if the cookie is missing or expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Write (or overwrite) a cookie that expires `max_age` from now.
    fn set(&self, name: &str, value: &str, max_age: Duration);

    /// Delete a cookie.
    fn remove(&self, name: &str) {
        self.set(name, "", -Duration::days(1));
    }
}

/// A stored cookie. `value` is kept URL-encoded, as it would be on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: DateTime<Utc>,
}

impl Cookie {
    pub fn new(name: &str, value: &str, expires: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value: encode(value),
            path: "/".to_string(),
            expires,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    pub fn decoded_value(&self) -> String {
        decode(&self.value)
    }

    /// Render as a `Set-Cookie`-style string:
    /// `authToken=T1; path=/; expires=Sat, 17 Oct 2026 10:00:00 GMT`.
    pub fn header(&self) -> String {
        format!(
            "{}={}; path={}; expires={}",
            self.name,
            self.value,
            self.path,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }
}

/// Look up `name` in a `document.cookie`-style string (`a=1; b=2`).
pub fn find_in_header(header: &str, name: &str) -> Option<String> {
    header
        .split("; ")
        .filter_map(|pair| pair.split_once('='))
        .filter(|(k, _)| *k == name)
        .map(|(_, v)| decode(v))
        .last()
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn decode(value: &str) -> String {
    form_urlencoded::parse(format!("v={value}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// In-memory cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<HashMap<String, Cookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the jar, e.g. from a file the host persisted earlier.
    pub fn from_cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let jar = Self::new();
        jar.cookies
            .borrow_mut()
            .extend(cookies.into_iter().map(|c| (c.name.clone(), c)));
        jar
    }

    /// Unexpired cookies, for persisting.
    pub fn snapshot(&self) -> Vec<Cookie> {
        let now = Utc::now();
        let mut cookies: Vec<Cookie> = self
            .cookies
            .borrow()
            .values()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect();
        cookies.sort_by(|a, b| a.name.cmp(&b.name));
        cookies
    }

    /// All unexpired cookies as a `document.cookie`-style string.
    pub fn header(&self) -> String {
        self.snapshot()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CookieStore for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.borrow();
        let cookie = cookies.get(name)?;
        if cookie.is_expired(Utc::now()) {
            return None;
        }
        Some(cookie.decoded_value())
    }

    fn set(&self, name: &str, value: &str, max_age: Duration) {
        let cookie = Cookie::new(name, value, Utc::now() + max_age);
        self.cookies.borrow_mut().insert(name.to_string(), cookie);
    }
}
