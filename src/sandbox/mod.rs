//! Sandboxed execution of untrusted code
//!
//! This module owns the lifecycle of one sandboxed run: building a safe
//! shell invocation for the requested language, launching a single-use
//! container under a fixed resource policy, and normalizing every outcome
//! of the container engine into one typed result.

pub mod command;
pub mod docker;
pub mod executor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use docker::DockerSubstrate;
pub use executor::Executor;

/// Smallest timeout a caller may request, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Largest timeout a caller may request, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 30;
/// Timeout applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Languages the executor image carries a toolchain for.
///
/// Unknown values are kept verbatim in `Other` so the orchestrator can name
/// them in its error without ever contacting the container engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    C,
    Python,
    Other(String),
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        match value.as_str() {
            "c" => Language::C,
            "python" => Language::Python,
            _ => Language::Other(value),
        }
    }
}

impl From<&str> for Language {
    fn from(value: &str) -> Self {
        Language::from(value.to_string())
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "c"),
            Language::Python => write!(f, "python"),
            Language::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One request for a sandboxed run. Constructed per call, never shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: Language,
    pub timeout_secs: u64,
}

/// Result of a sandboxed run. Produced exactly once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: Option<String>,
    pub exit_code: i64,
    /// Wall time of the container run in milliseconds, rounded to two
    /// decimal places. Zero on every failure path.
    pub container_time_ms: f64,
}

/// Fixed isolation constraints applied to every run.
///
/// Static per deployment; the request timeout is the only per-request knob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePolicy {
    pub memory_bytes: i64,
    pub cpu_period: i64,
    pub cpu_quota: i64,
    pub network_disabled: bool,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            memory_bytes: 128 * 1024 * 1024,
            cpu_period: 100_000,
            // 50% of one core
            cpu_quota: 50_000,
            network_disabled: true,
        }
    }
}

/// Errors surfaced by the execution substrate
#[derive(Debug, thiserror::Error)]
pub enum SubstrateError {
    #[error("program exited with status {exit_code}")]
    ProgramFailed { exit_code: i64, stderr: String },

    #[error("Executor image '{image}' not found. Run: docker compose build executor")]
    ImageMissing { image: String },

    #[error("Execution timed out after {limit_secs}s")]
    Timeout { limit_secs: u64 },

    #[error("Docker API error: {0}")]
    Api(String),
}

/// Capability to run one command inside a fresh, isolated, resource-bounded
/// environment and hand back its combined output.
///
/// Implemented by [`DockerSubstrate`] in production and by small stubs in
/// tests. Implementations must tolerate concurrent calls on one instance;
/// every call provisions an independent environment.
#[async_trait]
pub trait ExecutionSubstrate: Send + Sync {
    async fn run(
        &self,
        command: Vec<String>,
        policy: &ResourcePolicy,
        timeout: Duration,
    ) -> Result<Vec<u8>, SubstrateError>;
}
