//! HTTP boundary for the execution service.
//!
//! Owns request validation (non-empty code, timeout range) and the
//! request/response shapes; everything past validation is delegated to the
//! execution orchestrator, which never surfaces a fault.

pub mod handlers;
pub mod server;

pub use server::{router, AppState, WebServer};

/// Error types for web operations
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}
