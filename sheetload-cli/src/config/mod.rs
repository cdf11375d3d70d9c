//! Connection configuration
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. `$CONFIG_DIR/sheetload/config.toml`
//! 3. environment (`ARANGO_ENDPOINT`, `ARANGO_USERNAME`, `ARANGO_PASSWORD`),
//!    including values from a `.env` file
//! 4. command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::api::models::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_USERNAME};
use crate::api::{Connection, Credentials};

pub const ENV_ENDPOINT: &str = "ARANGO_ENDPOINT";
pub const ENV_USERNAME: &str = "ARANGO_USERNAME";
pub const ENV_PASSWORD: &str = "ARANGO_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default location of the config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sheetload").join("config.toml"))
}

impl Config {
    /// Load from an explicit file, or the default location when it exists,
    /// then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override values from the environment; `lookup` is `std::env::var` outside tests
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.connection.endpoint = endpoint;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.connection.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.connection.password = Some(password);
        }
    }
}

impl ConnectionConfig {
    /// Build a [`Connection`] once the password is known
    pub fn connection(&self, password: String) -> Connection {
        Connection::new(
            self.endpoint.clone(),
            Credentials::new(self.username.clone(), password),
        )
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.connection.username, "root");
        assert_eq!(config.connection.password, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [connection]
            endpoint = "http://db:8529"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.endpoint, "http://db:8529");
        assert_eq!(config.connection.username, "root");
        assert_eq!(config.connection.timeout_secs, 5);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            [connection]
            username = "loader"
            password = "from-file"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_PASSWORD, "from-env"), (ENV_ENDPOINT, "http://env:8529")]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.connection.username, "loader");
        assert_eq!(config.connection.password.as_deref(), Some("from-env"));
        assert_eq!(config.connection.endpoint, "http://env:8529");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[connection\nendpoint =").is_err());
    }

    #[test]
    fn test_connection_from_config() {
        let config = ConnectionConfig {
            timeout_secs: 9,
            ..Default::default()
        };
        let conn = config.connection("pw".to_string());
        assert_eq!(conn.credentials.username, "root");
        assert_eq!(conn.credentials.password, "pw");
        assert_eq!(conn.timeout, Duration::from_secs(9));
    }
}
