use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use todo_client::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where the cookie jar is persisted. Defaults to the user cache dir.
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,

    /// Where log files go. Defaults to the user config dir.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Layer `todo.toml` (or the file named by `TODO_CONFIG`) under
    /// `TODO_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = std::env::var("TODO_CONFIG").unwrap_or_else(|_| "todo.toml".to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(
                Environment::with_prefix("TODO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url is required".to_string());
        }
        if !self.base_url.starts_with("http") {
            return Err("base_url must be a valid HTTP(S) URL".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be positive".to_string());
        }
        Ok(())
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.cookie_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("todo-client")
                .join("cookies.json")
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("todo-client")
                .join("logs")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str) -> Settings {
        Settings {
            base_url: base_url.to_string(),
            cookie_file: None,
            log_dir: None,
            request_timeout_secs: 10,
        }
    }

    #[test]
    fn defaults_point_at_local_service() {
        let parsed: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.base_url, "http://localhost:3000");
        assert_eq!(parsed.request_timeout_secs, 10);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(settings("").validate().is_err());
        assert!(settings("localhost:3000").validate().is_err());
        assert!(settings("https://todo.example").validate().is_ok());
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("TODO_BASE_URL", "http://todo.test:8080");
        std::env::set_var("TODO_REQUEST_TIMEOUT_SECS", "3");
        let loaded = Settings::new();
        std::env::remove_var("TODO_BASE_URL");
        std::env::remove_var("TODO_REQUEST_TIMEOUT_SECS");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.base_url, "http://todo.test:8080");
        assert_eq!(loaded.request_timeout_secs, 3);
    }

    #[test]
    fn explicit_cookie_file_wins() {
        let mut s = settings("http://localhost:3000");
        s.cookie_file = Some(PathBuf::from("/tmp/jar.json"));
        assert_eq!(s.cookie_path(), PathBuf::from("/tmp/jar.json"));
        assert!(settings("http://x").cookie_path().ends_with("todo-client/cookies.json"));
    }
}
