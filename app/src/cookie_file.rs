use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use thiserror::Error;
use todo_client::{Cookie, CookieStore, MemoryCookieJar};

#[derive(Error, Debug)]
pub enum CookieFileError {
    #[error("Cookie storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A cookie jar mirrored to a JSON file, so the session survives restarts
/// the way a browser's cookie jar does.
pub struct FileCookieJar {
    path: PathBuf,
    jar: MemoryCookieJar,
}

impl FileCookieJar {
    /// Load the jar from `path`. A missing file is an empty jar.
    pub fn open(path: PathBuf) -> Result<Self, CookieFileError> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    CookieFileError::Storage(format!("Failed to create cookie directory: {}", e))
                })?;
            }
        }

        let jar = if path.exists() {
            let json = fs::read_to_string(&path)
                .map_err(|e| CookieFileError::Storage(format!("Failed to read cookies: {}", e)))?;
            let cookies: Vec<Cookie> = serde_json::from_str(&json)?;
            MemoryCookieJar::from_cookies(cookies)
        } else {
            MemoryCookieJar::new()
        };

        Ok(Self { path, jar })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), CookieFileError> {
        let json = serde_json::to_string_pretty(&self.jar.snapshot())?;

        fs::write(&self.path, json)
            .map_err(|e| CookieFileError::Storage(format!("Failed to save cookies: {}", e)))?;

        // Set permissions to 0600 (read/write for owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)
                .map_err(|e| {
                    CookieFileError::Storage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(|e| {
                CookieFileError::Storage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        Ok(())
    }
}

impl CookieStore for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.jar.get(name)
    }

    /// The in-memory write always happens; a failed save is logged and the
    /// session just won't outlive this process.
    fn set(&self, name: &str, value: &str, max_age: Duration) {
        self.jar.set(name, value, max_age);
        if let Err(err) = self.save() {
            tracing::warn!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_client::AUTH_COOKIE;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("todo-cookie-test-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("cookies.json")
    }

    #[test]
    fn token_survives_reopen() {
        let path = scratch_path("reopen");
        let jar = FileCookieJar::open(path.clone()).unwrap();
        jar.set(AUTH_COOKIE, "T1", Duration::days(1));

        let reopened = FileCookieJar::open(path).unwrap();
        assert_eq!(reopened.get(AUTH_COOKIE).as_deref(), Some("T1"));
    }

    #[test]
    fn removed_token_is_gone_after_reopen() {
        let path = scratch_path("remove");
        let jar = FileCookieJar::open(path.clone()).unwrap();
        jar.set(AUTH_COOKIE, "T1", Duration::days(1));
        jar.remove(AUTH_COOKIE);

        let reopened = FileCookieJar::open(path).unwrap();
        assert_eq!(reopened.get(AUTH_COOKIE), None);
    }

    #[cfg(unix)]
    #[test]
    fn cookie_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let path = scratch_path("perms");
        let jar = FileCookieJar::open(path.clone()).unwrap();
        jar.set(AUTH_COOKIE, "T1", Duration::days(1));
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
