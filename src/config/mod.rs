//! Service configuration: server binding and sandbox policy.
//!
//! Loaded from a TOML file when one is given, otherwise defaults matching
//! the reference deployment. Every field is optional in the file; missing
//! sections fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::sandbox::ResourcePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_enabled: true,
        }
    }
}

/// Sandbox settings: the executor image and the fixed resource ceilings
/// applied to every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Pre-built image the containers are instantiated from. Versioned and
    /// deployment-wide, never per-request.
    pub executor_image: String,
    pub memory_bytes: i64,
    pub cpu_period: i64,
    pub cpu_quota: i64,
    pub network_disabled: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let policy = ResourcePolicy::default();
        Self {
            executor_image: "sandrun-executor:latest".to_string(),
            memory_bytes: policy.memory_bytes,
            cpu_period: policy.cpu_period,
            cpu_quota: policy.cpu_quota,
            network_disabled: policy.network_disabled,
        }
    }
}

impl SandboxConfig {
    pub fn resource_policy(&self) -> ResourcePolicy {
        ResourcePolicy {
            memory_bytes: self.memory_bytes,
            cpu_period: self.cpu_period,
            cpu_quota: self.cpu_quota,
            network_disabled: self.network_disabled,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sandbox.executor_image.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sandbox.executor_image must not be empty".to_string(),
            ));
        }
        if self.sandbox.memory_bytes <= 0 {
            return Err(ConfigError::Invalid(
                "sandbox.memory_bytes must be positive".to_string(),
            ));
        }
        if self.sandbox.cpu_period <= 0 || self.sandbox.cpu_quota <= 0 {
            return Err(ConfigError::Invalid(
                "sandbox cpu period/quota must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
