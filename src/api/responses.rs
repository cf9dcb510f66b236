//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Rejection, state::SessionSnapshot};

/// Response body for every session mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    /// Machine-readable rejection reason, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, reason: Option<String>, session: SessionSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            reason,
            timestamp: Utc::now(),
            session,
        }
    }

    /// The write was applied
    pub fn ok(message: impl Into<String>, session: SessionSnapshot) -> Self {
        Self::new("ok", message.into(), None, session)
    }

    /// The write was refused; `session` is the unchanged state
    pub fn rejected(rejection: &Rejection, session: SessionSnapshot) -> Self {
        Self::new(
            "rejected",
            rejection.to_string(),
            Some(rejection.reason().to_string()),
            session,
        )
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of `PUT /session/work` and `PUT /session/rest`.
///
/// `minutes` may be a JSON number or a numeric string, as a form field would send it.
#[derive(Debug, Clone, Deserialize)]
pub struct MinutesRequest {
    pub minutes: serde_json::Value,
}

/// Body of `PUT /session/audio/volume`. Accepts a number or a numeric string, like `minutes`.
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeRequest {
    pub volume: serde_json::Value,
}
