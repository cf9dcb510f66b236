//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod session_driver;

// Re-export main types
pub use session_driver::{spawn_session_driver, Action, SessionDefaults, SessionHandle, TICK_PERIOD};
