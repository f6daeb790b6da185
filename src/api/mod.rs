//! HTTP API module
//!
//! Commands, host signals and read endpoints, all on one router.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Commands
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/toggle", post(toggle_handler))
        .route("/reset", post(reset_handler))
        .route("/history", post(show_history_handler).get(history_page_handler))
        .route("/auto-start/toggle", post(toggle_auto_start_handler))
        .route("/config/inactivity", post(configure_inactivity_handler))
        // Signals from the host
        .route("/activity", post(activity_handler))
        .route("/context", post(context_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
