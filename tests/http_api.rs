//! HTTP boundary tests, driven through the router with a stub substrate.
//!
//! Validation (empty code, timeout range) must reject requests before the
//! orchestrator runs; everything past validation comes back as a 200 with a
//! structured body, including failures.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sandrun::sandbox::{ExecutionSubstrate, Executor, ResourcePolicy, SubstrateError};
use sandrun::web::{router, AppState};

/// Substrate that always returns the same output.
struct FixedOutput(&'static str);

#[async_trait]
impl ExecutionSubstrate for FixedOutput {
    async fn run(
        &self,
        _command: Vec<String>,
        _policy: &ResourcePolicy,
        _timeout: Duration,
    ) -> Result<Vec<u8>, SubstrateError> {
        Ok(self.0.as_bytes().to_vec())
    }
}

/// Substrate that fails the test if the orchestrator ever reaches it.
struct Unreachable;

#[async_trait]
impl ExecutionSubstrate for Unreachable {
    async fn run(
        &self,
        _command: Vec<String>,
        _policy: &ResourcePolicy,
        _timeout: Duration,
    ) -> Result<Vec<u8>, SubstrateError> {
        panic!("substrate must not be contacted for this request");
    }
}

fn app_with(substrate: Arc<dyn ExecutionSubstrate>) -> Router {
    let executor = Arc::new(Executor::new(substrate, ResourcePolicy::default()));
    router(AppState { executor }, true)
}

fn app() -> Router {
    app_with(Arc::new(FixedOutput("hello\n")))
}

async fn post_execute(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/execute")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn executes_code_with_defaults() {
    let body = serde_json::json!({ "code": "int main() { return 0; }" });
    let (status, json) = post_execute(app(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["output"], "hello\n");
    assert_eq!(json["exit_code"], 0);
    assert!(json["error"].is_null());
    assert!(json["timing"]["wall_time_ms"].as_f64().unwrap() >= 0.0);
    assert!(json["timing"]["container_time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn rejects_empty_code() {
    let (status, json) = post_execute(app_with(Arc::new(Unreachable)), serde_json::json!({ "code": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Code cannot be empty");
}

#[tokio::test]
async fn rejects_whitespace_only_code() {
    let body = serde_json::json!({ "code": "  \n\t " });
    let (status, _) = post_execute(app_with(Arc::new(Unreachable)), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_out_of_range_timeouts() {
    for timeout in [0u64, 31] {
        let body = serde_json::json!({ "code": "print(1)", "language": "python", "timeout": timeout });
        let (status, json) = post_execute(app_with(Arc::new(Unreachable)), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "timeout {} accepted", timeout);
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .contains("between 1 and 30"));
    }
}

#[tokio::test]
async fn accepts_boundary_timeouts() {
    for timeout in [1u64, 30] {
        let body = serde_json::json!({ "code": "print(1)", "language": "python", "timeout": timeout });
        let (status, json) = post_execute(app(), body).await;
        assert_eq!(status, StatusCode::OK, "timeout {} rejected", timeout);
        assert_eq!(json["success"], true);
    }
}

#[tokio::test]
async fn unsupported_language_is_a_structured_result() {
    let body = serde_json::json!({ "code": "package main", "language": "go-lang" });
    let (status, json) = post_execute(app_with(Arc::new(Unreachable)), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["timing"]["container_time_ms"], 0.0);
    assert!(json["error"].as_str().unwrap().contains("go-lang"));
}

#[tokio::test]
async fn failure_paths_keep_the_response_shape() {
    struct Failing;

    #[async_trait]
    impl ExecutionSubstrate for Failing {
        async fn run(
            &self,
            _command: Vec<String>,
            _policy: &ResourcePolicy,
            _timeout: Duration,
        ) -> Result<Vec<u8>, SubstrateError> {
            Err(SubstrateError::ImageMissing {
                image: "sandrun-executor:latest".to_string(),
            })
        }
    }

    let body = serde_json::json!({ "code": "print(1)", "language": "python" });
    let (status, json) = post_execute(app_with(Arc::new(Failing)), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["output"], "");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("sandrun-executor:latest"));
}

#[tokio::test]
async fn health_reports_version() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
