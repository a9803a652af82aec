//! HTTP gateway (Axum) for deterministic generation.
//!
//! This module is primarily used by the `lockstep` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::{
    CleanupResponse, HealthResponse, cleanup_handler, generate_handler, health_handler,
    stats_handler,
};
pub use state::HandlerState;

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
