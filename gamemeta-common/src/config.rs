//! Configuration loading and validation
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line `--config`)
//! 2. `GAMEMETA_CONFIG` environment variable
//! 3. `<platform config dir>/gamemeta/config.toml`
//! 4. Built-in defaults (no file)
//!
//! Every field has a built-in default, so a partial TOML file is valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GAMEMETA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Ranking and cache settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Resilience settings for title-search endpoints
    #[serde(default)]
    pub search_guard: GuardSettings,

    /// Resilience settings for the detail endpoint
    #[serde(default)]
    pub detail_guard: GuardSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connection establishment timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// User-Agent override (defaults to [`user_agent()`])
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Effective User-Agent string
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(user_agent)
    }
}

/// Secondary ordering applied after exact-match and fuzzy score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakOrder {
    /// Description presence, then source priority
    #[default]
    DescriptionFirst,
    /// Source priority, then description presence
    PriorityFirst,
}

/// Ranking and cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Result count used when the caller does not specify one
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Candidates scoring below this (0-100) are discarded
    #[serde(default = "default_min_fuzzy_score")]
    pub min_fuzzy_score: u8,

    /// Minimum score for the fuzzy fallback during id resolution
    #[serde(default = "default_id_fallback_min_score")]
    pub id_fallback_min_score: u8,

    /// Capacity of each recency cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub tie_break: TieBreakOrder,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            min_fuzzy_score: default_min_fuzzy_score(),
            id_fallback_min_score: default_id_fallback_min_score(),
            cache_capacity: default_cache_capacity(),
            tie_break: TieBreakOrder::default(),
        }
    }
}

/// Bulkhead, rate limiter and retry parameters for one upstream endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSettings {
    /// Maximum concurrently in-flight calls
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,

    /// How long a caller waits for a bulkhead slot
    #[serde(default = "default_wait_ms")]
    pub max_wait_ms: u64,

    /// Permits released every refresh period
    #[serde(default = "default_limit_for_period")]
    pub limit_for_period: u32,

    /// Length of one rate-limiter window
    #[serde(default = "default_refresh_period_ms")]
    pub refresh_period_ms: u64,

    /// How long a caller waits for a rate-limiter permit
    #[serde(default = "default_wait_ms")]
    pub limiter_timeout_ms: u64,

    /// Total attempts including the first call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts
    #[serde(default = "default_retry_wait_ms")]
    pub retry_wait_ms: u64,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            max_wait_ms: default_wait_ms(),
            limit_for_period: default_limit_for_period(),
            refresh_period_ms: default_refresh_period_ms(),
            limiter_timeout_ms: default_wait_ms(),
            max_attempts: default_max_attempts(),
            retry_wait_ms: default_retry_wait_ms(),
        }
    }
}

impl GuardSettings {
    fn validate(&self, section: &str) -> Result<()> {
        if self.max_concurrent_calls == 0 {
            return Err(Error::Config(format!(
                "[{}] max_concurrent_calls must be at least 1",
                section
            )));
        }
        if self.limit_for_period == 0 {
            return Err(Error::Config(format!(
                "[{}] limit_for_period must be at least 1",
                section
            )));
        }
        if self.refresh_period_ms == 0 {
            return Err(Error::Config(format!(
                "[{}] refresh_period_ms must be greater than 0",
                section
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config(format!(
                "[{}] max_attempts must be at least 1",
                section
            )));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_max_results() -> usize {
    10
}

fn default_min_fuzzy_score() -> u8 {
    60
}

fn default_id_fallback_min_score() -> u8 {
    90
}

fn default_cache_capacity() -> usize {
    100
}

fn default_max_concurrent_calls() -> usize {
    8
}

fn default_wait_ms() -> u64 {
    10 * 60 * 1000
}

fn default_limit_for_period() -> u32 {
    4
}

fn default_refresh_period_ms() -> u64 {
    1_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_wait_ms() -> u64 {
    2_000
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the resolver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.resolver.cache_capacity == 0 {
            return Err(Error::Config(
                "[resolver] cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.resolver.default_max_results == 0 {
            return Err(Error::Config(
                "[resolver] default_max_results must be at least 1".to_string(),
            ));
        }
        if self.resolver.min_fuzzy_score > 100 || self.resolver.id_fallback_min_score > 100 {
            return Err(Error::Config(
                "[resolver] fuzzy score thresholds must be within 0-100".to_string(),
            ));
        }
        self.search_guard.validate("search_guard")?;
        self.detail_guard.validate("detail_guard")?;
        Ok(())
    }
}

/// Load configuration following the documented priority order
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit_path {
        return read_config_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return read_config_file(Path::new(&path));
        }
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            return read_config_file(&path);
        }
        debug!(path = %path.display(), "No config file found, using built-in defaults");
    }

    Ok(TomlConfig::default())
}

/// Read and validate one TOML config file
pub fn read_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = TomlConfig::from_toml_str(&content)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gamemeta").join("config.toml"))
}

/// Standard User-Agent for outbound HTTP requests
pub fn user_agent() -> String {
    format!("gamemeta/{}", env!("CARGO_PKG_VERSION"))
}
