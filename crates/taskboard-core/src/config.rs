//! Application Configuration
//!
//! Serde-backed settings for the mock backend and logging. Every field has a
//! default so a partial JSON document is enough.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest artificial latency the mock backend accepts
pub const MAX_LATENCY_MS: u64 = 10_000;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("latency_ms must be at most {max}, got {value}")]
    LatencyTooHigh { value: u64, max: u64 },
    #[error("namespace must not be empty")]
    EmptyNamespace,
    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Which fixture profile the mock backend runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Seeded data and a visible delay
    #[default]
    Development,
    /// Empty and instant
    Test,
}

/// Mock backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub environment: Environment,
    /// Route prefix, without slashes
    pub namespace: String,
    /// Delay applied before every request is handled
    pub latency_ms: u64,
    /// Load the welcome tasks on startup
    pub seed: bool,
}

impl ServerConfig {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                environment,
                namespace: "api".to_string(),
                latency_ms: 400,
                seed: true,
            },
            Environment::Test => Self {
                environment,
                namespace: "api".to_string(),
                latency_ms: 0,
                seed: false,
            },
        }
    }

    pub fn test() -> Self {
        Self::for_environment(Environment::Test)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::LatencyTooHigh {
                value: self.latency_ms,
                max: MAX_LATENCY_MS,
            });
        }
        if self.namespace.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
