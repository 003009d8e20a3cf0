//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the port eagerly, then serves on a background
//! Tokio task so the HTTP API runs concurrently with the timeline driver.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chronomap_observer::server::ServerConfig;
//! use chronomap_observer::startup::spawn_observer;
//! use chronomap_observer::state::AppState;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::default());
//! let (handle, addr) = spawn_observer(&ServerConfig::default(), state).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The port is bound before the task is spawned, so an unusable address
/// is reported here rather than logged from the background. Returns the
/// task handle and the bound address.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(JoinHandle<()>, SocketAddr), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok((handle, addr))
}
