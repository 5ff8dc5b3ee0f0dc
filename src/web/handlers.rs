//! HTTP API handlers for the execution service.

use super::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::sandbox::{
    ExecutionRequest, Language, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};

/// Code execution request
#[derive(Debug, Deserialize)]
pub struct ExecuteApiRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Max seconds the run may take, 1..=30.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_language() -> String {
    "c".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Serialize)]
pub struct TimingInfo {
    /// Wall clock around the whole orchestrator call, including handle
    /// acquisition and serialization.
    pub wall_time_ms: f64,
    /// Substrate-internal figure for the container run itself.
    pub container_time_ms: f64,
}

/// Code execution response
#[derive(Debug, Serialize)]
pub struct ExecuteApiResponse {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub exit_code: i64,
    pub timing: TimingInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn bad_request(detail: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

/// Accept user code, run it in a sandboxed container, and return output
/// plus timing. Structurally invalid requests are rejected here; everything
/// else comes back as a structured result from the orchestrator.
pub async fn execute_code(
    State(state): State<AppState>,
    Json(request): Json<ExecuteApiRequest>,
) -> Result<Json<ExecuteApiResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.code.trim().is_empty() {
        return Err(bad_request("Code cannot be empty"));
    }
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&request.timeout) {
        return Err(bad_request(&format!(
            "timeout must be between {} and {} seconds",
            MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS
        )));
    }

    let started = Instant::now();
    let result = state
        .executor
        .execute(ExecutionRequest {
            code: request.code,
            language: Language::from(request.language),
            timeout_secs: request.timeout,
        })
        .await;
    let wall_time_ms = (started.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0;

    Ok(Json(ExecuteApiResponse {
        success: result.success,
        output: result.stdout,
        error: result.stderr,
        exit_code: result.exit_code,
        timing: TimingInfo {
            wall_time_ms,
            container_time_ms: result.container_time_ms,
        },
    }))
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
