//! Configuration for the fraud engine
//!
//! Rule weights, thresholds and denylists are constants in [`crate::rules`];
//! only operational settings live here.

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Logging configuration
    pub log: LogConfig,

    /// History store configuration
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "fraud-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log: LogConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of lock shards (power of two, > 1)
    pub shard_amount: usize,

    /// Initial account capacity
    pub initial_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            shard_amount: 64,
            initial_capacity: 1024,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(level) = std::env::var("FRAUD_ENGINE_LOG_LEVEL") {
            config.log.level = level;
        }

        if let Ok(json) = std::env::var("FRAUD_ENGINE_LOG_JSON") {
            config.log.json = parse_bool(&json).ok_or_else(|| {
                crate::Error::Config(format!("FRAUD_ENGINE_LOG_JSON is not a boolean: {}", json))
            })?;
        }

        if let Ok(shards) = std::env::var("FRAUD_ENGINE_HISTORY_SHARDS") {
            config.history.shard_amount = shards.parse().map_err(|e| {
                crate::Error::Config(format!("FRAUD_ENGINE_HISTORY_SHARDS: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings the history store depends on
    pub fn validate(&self) -> crate::Result<()> {
        let shards = self.history.shard_amount;
        if shards < 2 || !shards.is_power_of_two() {
            return Err(crate::Error::Config(format!(
                "history.shard_amount must be a power of two greater than 1, got {}",
                shards
            )));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
