//! Error types for the focus-session engine

use thiserror::Error;

/// A rejected write to a UI-facing setting.
///
/// The setter that returns this leaves the prior value in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Durations are frozen while the session clock runs
    #[error("durations cannot change while the session is running")]
    SessionRunning,

    #[error("'{0}' is not a whole number")]
    NotNumeric(String),

    #[error("{0} is not a positive number of minutes")]
    NotPositive(i64),

    #[error("{0} minutes is longer than a phase can be")]
    MinutesOutOfRange(i64),

    #[error("volume {0} is outside 0..=100")]
    VolumeOutOfRange(i64),
}

impl Rejection {
    /// Short machine-readable reason for API bodies
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::SessionRunning => "session_running",
            Rejection::NotNumeric(_) => "not_numeric",
            Rejection::NotPositive(_) => "not_positive",
            Rejection::MinutesOutOfRange(_) => "minutes_out_of_range",
            Rejection::VolumeOutOfRange(_) => "volume_out_of_range",
        }
    }
}

/// Failure to begin ambient playback. Never fatal.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("no ambience source configured")]
    NoSource,

    #[error("failed to spawn audio player: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("audio channel refused to start: {0}")]
    Refused(String),
}

/// The session driver task is no longer running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("session driver is not running")]
pub struct DriverError;
