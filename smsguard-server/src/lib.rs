//! HTTP endpoint and command line for the smsguard spam classifier.
//!
//! The server classifies one message per request with the engine chosen at
//! startup and keeps the last [`history::HISTORY_CAPACITY`] results in memory.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod routes;
pub mod state;

use std::sync::Arc;

pub use config::ServerConfig;
pub use error::ApiError;
pub use history::{History, HistoryEntry};
pub use routes::create_router;
pub use state::AppState;

use tokio::net::TcpListener;
use tracing::{info, warn};

/// Binds `state.config.bind_addr()` and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, strategy = %state.engine.strategy(), "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
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
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
