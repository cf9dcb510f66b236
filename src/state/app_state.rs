//! Main application state shared by the HTTP handlers

use std::{sync::Mutex, time::Instant};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    error::DriverError,
    tasks::{session_driver::CommandReply, Action, SessionHandle},
};

/// Shared server state: the session handle plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Front door to the session driver task
    pub session: SessionHandle,
    /// Bearer token that marks a request as coming from a logged-in user
    access_token: Option<String>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(session: SessionHandle, access_token: Option<String>, port: u16, host: String) -> Self {
        Self {
            session,
            access_token,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Whether a request with this bearer token belongs to an authenticated session.
    ///
    /// With no token configured every request is let through.
    pub fn is_authenticated(&self, bearer: Option<&str>) -> bool {
        match &self.access_token {
            None => true,
            Some(expected) => bearer == Some(expected.as_str()),
        }
    }

    pub fn auth_required(&self) -> bool {
        self.access_token.is_some()
    }

    /// Forward an action to the session driver and note it as the last action
    pub async fn perform(&self, label: &str, action: Action) -> Result<CommandReply, DriverError> {
        debug!("Performing {} ({:?})", label, action);
        let reply = self.session.send(action).await?;

        if reply.is_ok() {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some((label.to_string(), Utc::now()));
            }
        } else {
            debug!("{} rejected", label);
        }

        Ok(reply)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }
}
