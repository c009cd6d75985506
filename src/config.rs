//! Configuration management for Ecomdesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{EcomdeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Ecomdesk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Customer chat behavior
    #[serde(default)]
    pub chat: ChatConfig,
    /// Local session storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the claims backend (trailing slashes are ignored)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Customer chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Interval between case status polls while a case is open (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    crate::chat::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ChatConfig {
    /// Poll cadence as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Local session storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the session database; `None` uses the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

const MIN_POLL_INTERVAL_MS: u64 = 250;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EcomdeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| EcomdeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("ECOMDESK_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("ECOMDESK_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ECOMDESK_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(interval) = std::env::var("ECOMDESK_POLL_INTERVAL_MS") {
            if let Ok(value) = interval.parse() {
                self.chat.poll_interval_ms = value;
            } else {
                tracing::warn!("Invalid ECOMDESK_POLL_INTERVAL_MS: {}", interval);
            }
        }

        if let Ok(db_path) = std::env::var("ECOMDESK_SESSION_DB") {
            self.storage.path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.api_base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(db_path) = &cli.session_db {
            self.storage.path = Some(db_path.clone());
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            EcomdeskError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(EcomdeskError::Config(format!(
                "api.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(EcomdeskError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.chat.poll_interval_ms) {
            return Err(EcomdeskError::Config(format!(
                "chat.poll_interval_ms must be between {} and {}",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, test_config, test_config_yaml};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.chat.poll_interval_ms, 3000);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = test_config();
        config.api.base_url = "not a url".to_string();
        assert_error_contains(config.validate(), "api.base_url");
    }

    #[test]
    fn test_config_validation_non_http_scheme() {
        let mut config = test_config();
        config.api.base_url = "ftp://example.com".to_string();
        assert_error_contains(config.validate(), "http");
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = test_config();
        config.api.timeout_seconds = 0;
        assert_error_contains(config.validate(), "api.timeout_seconds");
    }

    #[test]
    fn test_config_validation_poll_interval_bounds() {
        let mut config = test_config();
        config.chat.poll_interval_ms = 10;
        assert_error_contains(config.validate(), "chat.poll_interval_ms");
        config.chat.poll_interval_ms = 120_000;
        assert!(config.validate().is_err());
        config.chat.poll_interval_ms = 250;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: https://claims.example.com/
  timeout_seconds: 10
chat:
  poll_interval_ms: 5000
storage:
  path: /tmp/ecomdesk/session.db
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://claims.example.com/");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.chat.poll_interval(), Duration::from_millis(5000));
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/ecomdesk/session.db"))
        );
    }

    #[test]
    #[serial]
    fn test_load_full_file() {
        std::env::remove_var("ECOMDESK_API_BASE_URL");
        std::env::remove_var("ECOMDESK_POLL_INTERVAL_MS");
        std::env::remove_var("ECOMDESK_SESSION_DB");
        let dir = crate::test_utils::temp_dir();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, test_config_yaml()).unwrap();

        let config = Config::load(path.to_str().unwrap(), &crate::cli::Cli::default()).unwrap();
        assert_eq!(config.api.base_url, "http://claims.internal:9000");
        assert_eq!(config.chat.poll_interval_ms, 500);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/ecomdesk-test.db"))
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("api:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.chat.poll_interval_ms, 3000);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        std::env::remove_var("ECOMDESK_API_BASE_URL");
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/ecomdesk.yaml", &cli).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("ECOMDESK_API_BASE_URL", "http://backend:9000");
        std::env::set_var("ECOMDESK_POLL_INTERVAL_MS", "not-a-number");
        std::env::set_var("ECOMDESK_SESSION_DB", "/tmp/override.db");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.chat.poll_interval_ms, 3000);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/override.db")));

        std::env::remove_var("ECOMDESK_API_BASE_URL");
        std::env::remove_var("ECOMDESK_POLL_INTERVAL_MS");
        std::env::remove_var("ECOMDESK_SESSION_DB");
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        let cli = crate::cli::Cli {
            api_base_url: Some("http://cli:1234".to_string()),
            session_db: Some(PathBuf::from("/tmp/cli.db")),
            ..Default::default()
        };
        config.apply_cli_overrides(&cli);
        assert_eq!(config.api.base_url, "http://cli:1234");
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/cli.db")));
    }
}
