//! HTTP API module
//!
//! This module exposes the timer session to display clients over local HTTP.

pub mod handlers;
pub mod requests;
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
        .route("/presets", get(presets_handler))
        .route("/timer", get(timer_handler).delete(discard_handler))
        .route("/timer/preset/:id", post(select_preset_handler))
        .route("/timer/manual", post(select_manual_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/adjust", post(adjust_handler))
        .route("/timer/split", post(split_handler))
        .route("/timer/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
