use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::{self, StorageError};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_DATA_FILE: &str = "tasks.json";
pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Digest of the fallback master password (`randomforest`).
pub const DEFAULT_PASSWORD_HASH: &str =
    "ea424017c57b0d0b2f262edd821dca2dc3cfcbb47e296a9007415af86bbc6ac1";

/// Contents of the configuration file. The credential gate rewrites this
/// whole document every time it issues a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Legacy shared key, kept so existing files round-trip unchanged.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub token_hashes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

pub struct Config {
    pub stored: StoredConfig,
    pub server_host: String,
    pub server_port: u16,
    pub config_path: PathBuf,
    pub data_file: PathBuf,
    /// Directory holding the web UI (`index.html` plus assets).
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads the configuration file named by `TASKMATE_CONFIG` (default
    /// `config.json`) and applies the process environment on top of it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_path =
            env_var("TASKMATE_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        Self::load(config_path)
    }

    /// Reads the configuration file at `config_path`, if any, then applies
    /// environment overrides and defaults. Environment values win over the
    /// file.
    pub fn load(config_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = config_path.into();
        let mut stored: StoredConfig = storage::read_json(&config_path)?.unwrap_or_default();

        if let Some(port) = env_var("TASKMATE_PORT") {
            stored.port = port;
        }
        if stored.port.is_empty() {
            stored.port = DEFAULT_PORT.to_string();
        }

        if let Some(api_key) = env_var("TASKMATE_API_KEY") {
            stored.api_key = api_key;
        }

        if let Some(password_hash) = env_var("TASKMATE_PASSWORD_HASH") {
            stored.password_hash = password_hash;
        }
        if stored.password_hash.is_empty() {
            warn!("Using default password hash. Set TASKMATE_PASSWORD_HASH for production.");
            stored.password_hash = DEFAULT_PASSWORD_HASH.to_string();
        }

        let server_port = stored
            .port
            .parse()
            .map_err(|_| ConfigError::InvalidPort(stored.port.clone()))?;

        Ok(Self {
            stored,
            server_host: env_var("TASKMATE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port,
            config_path,
            data_file: env_var("TASKMATE_DATA_FILE")
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
                .into(),
            static_dir: env_var("TASKMATE_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const OVERRIDES: [&str; 6] = [
        "TASKMATE_PORT",
        "TASKMATE_API_KEY",
        "TASKMATE_PASSWORD_HASH",
        "TASKMATE_HOST",
        "TASKMATE_DATA_FILE",
        "TASKMATE_STATIC_DIR",
    ];

    lazy_static! {
        static ref ENV_LOCK: Mutex<()> = Mutex::new(());
    }

    // Runs `test_logic` with the given overrides set and every other
    // TASKMATE_* variable cleared, restoring the environment afterwards.
    fn with_env<F>(vars: &[(&str, &str)], test_logic: F)
    where
        F: FnOnce(),
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<(&str, Option<String>)> =
            OVERRIDES.iter().map(|key| (*key, env::var(key).ok())).collect();
        for key in OVERRIDES {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test_logic));

        for (key, value) in saved {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }

        if let Err(panic_payload) = result {
            std::panic::resume_unwind(panic_payload);
        }
    }

    #[test]
    fn test_defaults_without_file() {
        with_env(&[], || {
            let dir = TempDir::new().unwrap();
            let config = Config::load(dir.path().join("config.json")).unwrap();

            assert_eq!(config.server_port, 8080);
            assert_eq!(config.server_host, "0.0.0.0");
            assert_eq!(config.stored.port, "8080");
            assert_eq!(config.stored.password_hash, DEFAULT_PASSWORD_HASH);
            assert!(config.stored.token_hashes.is_empty());
            assert_eq!(config.data_file, PathBuf::from("tasks.json"));
            assert_eq!(config.static_dir, PathBuf::from("static"));
            assert_eq!(config.server_url(), "http://0.0.0.0:8080");
        });
    }

    #[test]
    fn test_file_values_are_used() {
        with_env(&[], || {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.json");
            fs::write(
                &path,
                r#"{"api_key": "legacy", "port": "9090", "password_hash": "abc", "token_hashes": ["t1", "t2"]}"#,
            )
            .unwrap();

            let config = Config::load(&path).unwrap();
            assert_eq!(config.server_port, 9090);
            assert_eq!(config.stored.api_key, "legacy");
            assert_eq!(config.stored.password_hash, "abc");
            assert_eq!(config.stored.token_hashes, vec!["t1", "t2"]);
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        with_env(
            &[
                ("TASKMATE_PORT", "3000"),
                ("TASKMATE_PASSWORD_HASH", "from-env"),
                ("TASKMATE_API_KEY", "env-key"),
                ("TASKMATE_HOST", "127.0.0.1"),
                ("TASKMATE_DATA_FILE", "/tmp/taskmate-tasks.json"),
                ("TASKMATE_STATIC_DIR", "/srv/taskmate-ui"),
            ],
            || {
                let dir = TempDir::new().unwrap();
                let path = dir.path().join("config.json");
                fs::write(&path, r#"{"port": "9090", "password_hash": "abc"}"#).unwrap();

                let config = Config::load(&path).unwrap();
                assert_eq!(config.server_port, 3000);
                assert_eq!(config.server_host, "127.0.0.1");
                assert_eq!(config.stored.password_hash, "from-env");
                assert_eq!(config.stored.api_key, "env-key");
                assert_eq!(config.data_file, PathBuf::from("/tmp/taskmate-tasks.json"));
                assert_eq!(config.static_dir, PathBuf::from("/srv/taskmate-ui"));
            },
        );
    }

    #[test]
    fn test_invalid_port() {
        with_env(&[("TASKMATE_PORT", "eighty")], || {
            let dir = TempDir::new().unwrap();
            match Config::load(dir.path().join("config.json")) {
                Err(ConfigError::InvalidPort(port)) => assert_eq!(port, "eighty"),
                other => panic!("expected InvalidPort, got {:?}", other.err()),
            }
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        with_env(&[], || {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.json");
            fs::write(&path, "{ port: 8080").unwrap();

            assert!(matches!(
                Config::load(&path),
                Err(ConfigError::Storage(StorageError::Json(_)))
            ));
        });
    }
}
