//! Game server lifecycle management.
//!
//! Provides [`start_server`] which binds to a TCP port and runs the Axum
//! server until the process is terminated.

use std::net::SocketAddr;
use std::sync::Arc;

use marketday_core::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Start the game server.
///
/// Binds to the configured address, builds the router, and serves
/// requests until the process is terminated.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or cannot be
/// bound, and [`ServerError::Serve`] if serving fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind {
            addr: format!("{}:{}", config.host, config.port),
            reason: format!("invalid address: {e}"),
        })?;

    let router = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Bind {
        addr: addr.to_string(),
        reason: e.to_string(),
    })?;

    info!(%addr, "Game server listening");

    axum::serve(listener, router)
        .await
        .map_err(|source| ServerError::Serve { source })?;

    Ok(())
}

/// Errors that can occur when starting or running the game server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// Why binding failed.
        reason: String,
    },

    /// The server encountered a fatal error while serving.
    #[error("serve error: {source}")]
    Serve {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
