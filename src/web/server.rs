//! Axum server wiring for the execution API.

use super::{handlers, WebError};
use crate::config::ServerConfig;
use crate::sandbox::Executor;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
}

pub struct WebServer {
    config: ServerConfig,
    state: AppState,
}

impl WebServer {
    pub fn new(config: ServerConfig, executor: Arc<Executor>) -> Self {
        Self {
            config,
            state: AppState { executor },
        }
    }

    /// Start the web server
    pub async fn start(self) -> Result<(), WebError> {
        let addr = format!("{}:{}", self.config.host, self.config.port)
            .parse::<SocketAddr>()
            .map_err(|e| WebError::StartupFailed(format!("Invalid address: {}", e)))?;

        let app = router(self.state, self.config.cors_enabled);

        info!("sandrun API listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| WebError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| WebError::StartupFailed(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the application router. Public so tests can drive the API without
/// binding a socket.
pub fn router(state: AppState, cors_enabled: bool) -> Router {
    let api_routes = Router::new().route("/execute", post(handlers::execute_code));

    let mut app = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health))
        .with_state(state);

    if cors_enabled {
        app = app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
    }

    app
}
