//! Configuration management for the swap status service
//!
//! Loads configuration from TOML files with environment variable substitution.
//! Credentials are expected to arrive through `${VAR}` references so the file
//! itself can be committed.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "SWAP_STATUS_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub log_search: LogSearchConfig,
    pub matched_orders: MatchedOrdersConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound on acquiring a connection and running the order query
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSearchConfig {
    pub base_url: String,
    pub token: String,
    /// Container label the relay logs are shipped under
    #[serde(default = "default_log_source")]
    pub source: String,
    #[serde(default = "default_log_limit")]
    pub limit: u32,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    /// Half-width of the window searched around `created_at`
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
    #[serde(default = "default_max_lookback_secs")]
    pub max_lookback_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchedOrdersConfig {
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

fn default_max_connections() -> u32 {
    4
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_log_source() -> String {
    "/staging-evm-relay".to_string()
}

fn default_log_limit() -> u32 {
    100
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_window_secs() -> i64 {
    300
}

fn default_max_lookback_secs() -> i64 {
    30 * 24 * 3600
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl LogSearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MatchedOrdersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from the file named by `SWAP_STATUS_CONFIG`,
    /// falling back to `config/default.toml`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text, substituting `${VAR}` references first
    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let required = [
            ("database.url", &self.database.url),
            ("log_search.base_url", &self.log_search.base_url),
            ("log_search.token", &self.log_search.token),
            ("matched_orders.base_url", &self.matched_orders.base_url),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Missing required configuration value: {}", key);
            }
        }

        if self.log_search.window_secs < 0 {
            anyhow::bail!("log_search.window_secs must not be negative");
        }
        if self.log_search.max_lookback_secs <= 0 {
            anyhow::bail!("log_search.max_lookback_secs must be positive");
        }
        if self.log_search.source.is_empty() {
            tracing::warn!("log_search.source is empty - log queries will match nothing");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
