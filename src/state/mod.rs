//! State management module
//! 
//! This module contains the session data structures and the shared server state.

pub mod app_state;
pub mod clock_state;
pub mod playback_state;
pub mod session_config;
pub mod session_snapshot;

// Re-export main types
pub use app_state::AppState;
pub use clock_state::{format_remaining, ClockState, Phase};
pub use playback_state::{PlaybackState, DEFAULT_VOLUME, MAX_VOLUME};
pub use session_config::{parse_minutes, SessionConfig, DEFAULT_REST_MINUTES, DEFAULT_WORK_MINUTES};
pub use session_snapshot::SessionSnapshot;
