//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod auth;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let session = Router::new()
        .route("/session", get(status_handler))
        .route("/session/start-pause", post(start_pause_handler))
        .route("/session/reset", post(reset_handler))
        .route("/session/work", put(work_minutes_handler))
        .route("/session/rest", put(rest_minutes_handler))
        .route("/session/audio/toggle", post(toggle_audio_handler))
        .route("/session/audio/volume", put(volume_handler))
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_session,
        ));

    Router::new()
        .merge(session)
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
