//! Configuration management for the HSE catalog client
//!
//! This module provides configuration loading with zero-config defaults, an
//! optional TOML file and environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::ClientConfig;
use crate::constants::{api, config as paths, env, http, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Backend and HTTP client settings
    pub api: ApiConfigToml,
    /// Search defaults
    pub search: SearchConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfigToml {
    /// Backend base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ApiConfigToml {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            tcp_nodelay: true,
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// Search defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfigToml {
    /// Page size to request; the server default applies when unset
    pub hits_per_page: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Convert to the runtime client configuration
    pub fn to_runtime_config(&self) -> ClientConfig {
        self.api.to_runtime_config()
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit, or the first one found)
    /// 3. Environment variables
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound { path }),
            Some(path) => Some(path),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(env::BASE_URL) {
            debug!("Using base URL from {}: {}", env::BASE_URL, base_url);
            self.api.base_url = base_url;
        }
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = Url::parse(&self.api.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                value: self.api.base_url.clone(),
                reason: e.to_string(),
            });
        }

        let positive = [
            ("api.rate_limit_rps", u64::from(self.api.rate_limit_rps)),
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            ("api.connect_timeout_secs", self.api.connect_timeout_secs),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Must be greater than zero".to_string(),
                });
            }
        }

        if self.search.hits_per_page == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "search.hits_per_page".to_string(),
                value: "0".to_string(),
                reason: "Leave unset to use the server default".to_string(),
            });
        }

        Ok(())
    }

    /// Write a commented default config file unless one already exists
    pub async fn initialize_first_run() -> ConfigResult<PathBuf> {
        let config_path = Self::default_config_path()?;
        Self::write_default_config(&config_path).await?;
        Ok(config_path)
    }

    /// Write the default config to `path` if nothing is there yet
    ///
    /// Returns whether a file was written.
    pub async fn write_default_config(path: &Path) -> ConfigResult<bool> {
        if path.exists() {
            debug!("Config file already exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Created default configuration file: {}", path.display());
        Ok(true)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(paths::LOCAL_FILE)];
        if let Ok(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(paths::APP_DIR).join(paths::FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# HSE Catalog Configuration
# You can customize any of these settings to suit your needs.

[api]
# Backend base URL (overridden by {env_var})
base_url = "{base_url}"
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
tcp_nodelay = true
pool_idle_timeout_secs = {pool_idle}
pool_max_per_host = {pool_max}
# Client-side throttling (requests per second)
rate_limit_rps = {rate_limit}

[search]
# Page size for searches; leave unset to use the server default
# hits_per_page = 24

[logging]
level = "warn"  # error, warn, info, debug, trace
"#,
            env_var = env::BASE_URL,
            base_url = api::BASE_URL,
            request_timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout = http::CONNECT_TIMEOUT.as_secs(),
            pool_idle = http::POOL_IDLE_TIMEOUT.as_secs(),
            pool_max = http::POOL_MAX_PER_HOST,
            rate_limit = limits::DEFAULT_RATE_LIMIT_RPS,
        )
    }
}

impl ApiConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.pool_max_per_host,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            rate_limit_rps: self.rate_limit_rps,
        }
    }
}
