//! Configuration management for Session-Relay

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Default key under which session state is stored
pub const DEFAULT_SESSION_KEY: &str = "storage_state";

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Factory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// CDP endpoint of the shared browser (ws:// or http://)
    pub endpoint: String,

    /// Key under which session state is persisted
    pub session_key: String,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Directory for the file-backed session store, if used
    pub state_dir: Option<String>,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:9222".to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            state_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(endpoint) = env::var("RELAY_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(key) = env::var("RELAY_SESSION_KEY") {
            config.session_key = key;
        }

        if let Ok(timeout) = env::var("RELAY_CONNECT_TIMEOUT") {
            config.connect_timeout_secs = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid RELAY_CONNECT_TIMEOUT"))?;
        }

        if let Ok(dir) = env::var("RELAY_STATE_DIR") {
            config.state_dir = Some(dir);
        }

        if let Ok(log_level) = env::var("RELAY_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session_key, DEFAULT_SESSION_KEY);
        assert_eq!(config.connect_timeout_secs, 30);
        assert!(config.state_dir.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config: Config = toml::from_str(
            r#"
            endpoint = "ws://browser:9222/devtools/browser/abc"
            session_key = "tenant_42"
            connect_timeout_secs = 10
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.session_key, "tenant_42");
        assert_eq!(config.connect_timeout_secs, 10);
    }
}
