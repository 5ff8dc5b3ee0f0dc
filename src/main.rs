//! sandrun - sandboxed code execution service
//!
//! Runs untrusted C and Python snippets inside single-use, resource-bounded
//! Docker containers and returns captured output with timing data.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use sandrun::config::Config;
use sandrun::sandbox::{DockerSubstrate, Executor};
use sandrun::web::WebServer;

/// sandrun service CLI
#[derive(Parser)]
#[command(name = "sandrun")]
#[command(about = "Runs untrusted C and Python code inside resource-bounded Docker containers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    let mut config = match cli.config {
        Some(path) => Config::load_from_path(&path)?,
        None => Config::default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    let substrate = DockerSubstrate::connect(config.sandbox.executor_image.clone())?;
    info!(
        "executor image: {}, memory: {} bytes, cpu quota: {}/{}",
        config.sandbox.executor_image,
        config.sandbox.memory_bytes,
        config.sandbox.cpu_quota,
        config.sandbox.cpu_period,
    );

    let executor = Arc::new(Executor::new(
        Arc::new(substrate),
        config.sandbox.resource_policy(),
    ));

    WebServer::new(config.server, executor).start().await?;

    Ok(())
}
