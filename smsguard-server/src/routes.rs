//! HTTP Routes
//!
//! Axum router configuration for the classifier endpoint.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router
///
/// # Routes
///
/// - `GET /` - Form and recent history
/// - `POST /classify` - Classify `{"text": ...}`
/// - `POST /check` - Classify `{"message": ...}`, label only
/// - `GET /history` - Last 50 classifications, oldest first
/// - `GET /health` - Strategy and model status
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/classify", post(handlers::classify))
        .route("/check", post(handlers::check))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
