//! Excel API server implementation
//!
//! HTTP REST API server using Axum. Every tool is reachable at
//! `POST /api/v1/tools/:name`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::WorkspaceConfig;
use crate::dispatch::Dispatcher;

/// API Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    pub version: String,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(workspace: &WorkspaceConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dispatcher: Dispatcher::new(workspace),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Tools
        .route("/api/v1/tools", get(handlers::list_tools))
        .route("/api/v1/tools/:name", post(handlers::call_tool))
        // Resources
        .route("/api/v1/files", get(handlers::list_files))
        .route("/api/v1/files/:filename/sheets", get(handlers::file_sheets))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server until SIGINT/SIGTERM.
///
/// Logging must already be initialized by the caller.
pub async fn run_api_server(config: ApiConfig, workspace: WorkspaceConfig) -> anyhow::Result<()> {
    workspace.prepare()?;
    let state = Arc::new(AppState::new(&workspace));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Excel API Server starting on http://{}", addr);
    info!("   Documents root: {}", workspace.root_dir.display());
    info!("   Endpoints: /api/v1/tools, /api/v1/tools/:name, /api/v1/files");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Excel API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_app_state_uses_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(&WorkspaceConfig::new(dir.path()));
        assert_eq!(state.dispatcher.root(), dir.path());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}
