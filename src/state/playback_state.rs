//! Ambient playback bookkeeping

use serde::{Deserialize, Serialize};

pub const DEFAULT_VOLUME: u8 = 50;
pub const MAX_VOLUME: u8 = 100;

/// User intent and observed status of the ambient audio track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// The user's last explicit "I want ambient audio" choice
    pub desired_on: bool,
    pub volume: u8,
    /// Only true after a start request has resolved successfully while
    /// the clock was still running and audio was still wanted
    pub actually_playing: bool,
}

impl PlaybackState {
    pub fn new(volume: u8) -> Self {
        Self {
            desired_on: false,
            volume: volume.min(MAX_VOLUME),
            actually_playing: false,
        }
    }

    /// Channel gain in `0.0..=1.0`
    pub fn gain(&self) -> f32 {
        f32::from(self.volume) / f32::from(MAX_VOLUME)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
