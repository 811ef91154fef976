//! HTTP server
//!
//! Builds the axum router and runs it until Ctrl+C or SIGTERM.

use super::handler;
use crate::error::{PanelError, Result};
use crate::panel::PeerManager;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for all handlers
pub struct AppState {
    /// Peer operations
    pub manager: PeerManager,
}

impl AppState {
    /// Wrap a manager
    pub fn new(manager: PeerManager) -> Self {
        Self { manager }
    }
}

/// Create the router with every route
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/clients", get(handler::list_clients))
        .route("/api/client", post(handler::create_client))
        .route(
            "/api/client/:id",
            put(handler::update_client).delete(handler::delete_client),
        )
        .route("/api/client/:id/toggle", post(handler::toggle_client))
        .route("/api/client/:id/config", get(handler::download_config))
        .route("/api/stats", get(handler::stats))
        .route("/healthz", get(handler::healthz))
        .route("/metrics", get(handler::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until a shutdown signal arrives
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| PanelError::Config(format!("Failed to bind {}: {}", addr, e)))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
