//! Focus Buddy - A focus-session timer served over HTTP
//! 
//! This library provides a work/rest interval engine that keeps an ambient
//! audio track in step with the running countdown, plus the task that drives
//! it and an HTTP surface for the UI.

pub mod config;
pub mod error;
pub mod state;
pub mod engine;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{AudioChannel, FocusSession};
pub use state::AppState;
pub use api::create_router;
pub use tasks::{spawn_session_driver, SessionHandle};
pub use utils::signals::shutdown_signal;
