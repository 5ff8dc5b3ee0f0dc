//! Execution orchestrator: drives one sandboxed run per request.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{command, ExecutionRequest, ExecutionResult, ExecutionSubstrate, ResourcePolicy, SubstrateError};

/// Orchestrates sandboxed runs against an injected execution substrate.
///
/// The substrate is shared across concurrent requests; each call gets its
/// own independently provisioned environment. Nothing here retries, and no
/// error escapes as a fault: every outcome becomes an [`ExecutionResult`].
pub struct Executor {
    substrate: Arc<dyn ExecutionSubstrate>,
    policy: ResourcePolicy,
}

impl Executor {
    pub fn new(substrate: Arc<dyn ExecutionSubstrate>, policy: ResourcePolicy) -> Self {
        Self { substrate, policy }
    }

    /// Run one request to completion and report the outcome.
    ///
    /// An unsupported language short-circuits before any substrate contact.
    /// `container_time_ms` is only ever non-zero on the success path; a run
    /// that fails reports zero regardless of how long it took.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let argv = match command::build_command(&request.code, &request.language) {
            Some(argv) => argv,
            None => {
                debug!(language = %request.language, "rejected unsupported language");
                return failure(1, format!("Unsupported language: {}", request.language));
            }
        };

        let timeout = Duration::from_secs(request.timeout_secs);
        let started = Instant::now();
        match self.substrate.run(argv, &self.policy, timeout).await {
            Ok(output) => {
                let elapsed_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
                debug!(elapsed_ms, "sandbox run completed");
                ExecutionResult {
                    success: true,
                    stdout: String::from_utf8_lossy(&output).into_owned(),
                    stderr: None,
                    exit_code: 0,
                    container_time_ms: elapsed_ms,
                }
            }
            Err(SubstrateError::ProgramFailed { exit_code, stderr }) => failure(exit_code, stderr),
            Err(err @ SubstrateError::Timeout { .. }) => {
                warn!(timeout_secs = request.timeout_secs, "sandbox run timed out");
                failure(1, err.to_string())
            }
            Err(err) => failure(1, err.to_string()),
        }
    }
}

fn failure(exit_code: i64, stderr: String) -> ExecutionResult {
    ExecutionResult {
        success: false,
        stdout: String::new(),
        stderr: Some(stderr),
        exit_code,
        container_time_ms: 0.0,
    }
}

fn round2(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
