//! Configuration loading and management
//!
//! Configuration is read from YAML. Every field has a default, so an empty
//! document (or no file at all) yields a working in-memory setup. A few values
//! can be overridden from the environment, see [`AppConfig::with_env_overrides`].

use crate::core::error::ConfigError;
use crate::core::retry::RetryPolicy;
use crate::core::timestamp::{DEFAULT_LOCAL_OFFSET_HOURS, TimestampNormalizer};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_BIND: &str = "CREWBOOK_BIND";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_LOCAL_OFFSET_HOURS: &str = "CREWBOOK_LOCAL_OFFSET_HOURS";

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub time: TimeConfig,
    pub retry: RetryPolicy,
    pub database: DatabaseConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0:3000"
    pub bind: String,

    /// Origins allowed by CORS; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

/// Time zone policy for local wall-clock inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Offset of the operator's local time from UTC, in whole hours
    pub local_offset_hours: i32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            local_offset_hours: DEFAULT_LOCAL_OFFSET_HOURS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str::<Self>(&content)
            .map_err(|e| ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            })?
            .validated()
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<Self>(yaml)?.validated()
    }

    /// Apply overrides from an environment lookup
    ///
    /// Takes the lookup as a function so tests need not touch the process
    /// environment; the binary passes `|key| std::env::var(key).ok()`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(raw) = lookup(ENV_LOCAL_OFFSET_HOURS) {
            self.time.local_offset_hours =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: ENV_LOCAL_OFFSET_HOURS.to_string(),
                        value: raw.clone(),
                        message: "expected a whole number of hours".to_string(),
                    })?;
        }
        self.validated()
    }

    /// Normalizer configured with the local offset
    pub fn normalizer(&self) -> Result<TimestampNormalizer, ConfigError> {
        TimestampNormalizer::with_offset_hours(self.time.local_offset_hours)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.normalizer()?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.base_delay_ms".to_string(),
                value: self.retry.base_delay_ms.to_string(),
                message: "must not exceed retry.max_delay_ms".to_string(),
            });
        }
        Ok(self)
    }
}
