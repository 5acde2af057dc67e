//! Runtime configuration.
//!
//! Server settings are resolved once at startup from CLI flags (with env
//! fallbacks, see `main.rs`). Handler credentials are not part of
//! [`ServerConfig`]: they are looked up with [`require_env`] each time a
//! handler runs, and a missing value surfaces as an ordinary task failure.

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::consts::{DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_LLM_URL, DEFAULT_PORT, LLM_URL_ENV};

/// Settings the server needs before it can accept requests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ServerConfig {
    /// `host:port` suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read a non-empty environment variable or fail with a message naming it.
pub fn require_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => bail!("environment variable {key} is not set"),
    }
}

/// Chat-completion endpoint, honouring the override variable.
pub fn llm_url() -> String {
    std::env::var(LLM_URL_ENV)
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_LLM_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.data_dir, PathBuf::from("/data"));
    }

    #[test]
    fn require_env_returns_value() {
        temp_env::with_var("TASKGATE_TEST_TOKEN", Some("secret"), || {
            assert_eq!(require_env("TASKGATE_TEST_TOKEN").unwrap(), "secret");
        });
    }

    #[test]
    fn require_env_fails_when_unset() {
        temp_env::with_var_unset("TASKGATE_TEST_TOKEN", || {
            let err = require_env("TASKGATE_TEST_TOKEN").unwrap_err();
            assert!(err.to_string().contains("TASKGATE_TEST_TOKEN"));
        });
    }

    #[test]
    fn require_env_rejects_blank_value() {
        temp_env::with_var("TASKGATE_TEST_TOKEN", Some("  "), || {
            assert!(require_env("TASKGATE_TEST_TOKEN").is_err());
        });
    }

    #[test]
    fn llm_url_defaults_and_overrides() {
        temp_env::with_var_unset(LLM_URL_ENV, || {
            assert_eq!(llm_url(), DEFAULT_LLM_URL);
        });
        temp_env::with_var(LLM_URL_ENV, Some("http://localhost:9/v1"), || {
            assert_eq!(llm_url(), "http://localhost:9/v1");
        });
    }
}
