use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

use crate::fetch::RetryPolicy;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PREFERENCES_PATH: &str = ".eventhub-preferences.json";

pub struct Config {
    pub host: String,
    pub port: u16,
    /// Frappe site URL. `None` runs the gateway against the in-memory backend.
    pub backend_url: Option<String>,
    pub backend_token: Option<String>,
    pub cors_origins: String,
    pub production: bool,
    pub preferences_path: PathBuf,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();

        Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_PORT),
            backend_url: non_empty_var("FRAPPE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            backend_token: non_empty_var("FRAPPE_API_TOKEN"),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| cors::DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: env::var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            preferences_path: env::var("PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREFERENCES_PATH)),
            retry: RetryPolicy {
                max_retries: parse_var("FETCH_MAX_RETRIES").unwrap_or(defaults.max_retries),
                backoff: parse_var("FETCH_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.backoff),
                attempt_timeout: parse_var("FETCH_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.attempt_timeout),
            },
        }
    }

    /// Configuration for tests and local runs: in-memory backend, no HSTS.
    pub fn local(preferences_path: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            backend_url: None,
            backend_token: None,
            cors_origins: cors::DEFAULT_ALLOWED_ORIGINS.to_string(),
            production: false,
            preferences_path: preferences_path.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.port)))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = non_empty_var(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Config: ignoring invalid value '{}' for {}", raw, key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config_uses_memory_backend() {
        let config = Config::local("/tmp/prefs.json");
        assert!(config.backend_url.is_none());
        assert!(!config.production);
        assert_eq!(config.retry.max_retries, 1);
    }

    #[test]
    fn test_socket_addr_falls_back_on_bad_host() {
        let mut config = Config::local("/tmp/prefs.json");
        config.host = "not a host".to_string();
        config.port = 4000;
        assert_eq!(config.socket_addr(), SocketAddr::from(([0, 0, 0, 0], 4000)));
    }
}
