//! External service module
//! 
//! This module contains the process-backed audio channel used for ambient sound.

pub mod audio;

// Re-export main types
pub use audio::{check_player_available, PlayerChannel};
