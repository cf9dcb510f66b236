//! Login gate for the session endpoints

use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Only let requests from an authenticated session reach the focus session
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !state.is_authenticated(bearer_token(&request)) {
        debug!("Rejecting unauthenticated request to {}", request.uri().path());
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}
