// sandrun - sandboxed code execution service
//
// Accepts untrusted C or Python source over HTTP, runs it inside a
// single-use, resource-bounded Docker container, and returns captured
// output together with timing data.

pub mod config;
pub mod sandbox;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use sandbox::{
    ExecutionRequest, ExecutionResult, ExecutionSubstrate, Executor, Language, ResourcePolicy,
    SubstrateError,
};
pub use web::WebServer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
