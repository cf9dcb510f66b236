//! Read-only view of a session for rendering

use serde::{Deserialize, Serialize};

use super::{format_remaining, ClockState, Phase, PlaybackState, SessionConfig};

/// Everything a renderer needs to draw the focus session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub phase_label: String,
    pub remaining_seconds: u64,
    /// `remaining_seconds` as `MM:SS`
    pub remaining: String,
    pub total_seconds: u64,
    /// Elapsed share of the current phase, `0.0..=100.0`
    pub progress_pct: f64,
    pub running: bool,
    pub work_minutes: u32,
    pub rest_minutes: u32,
    pub audio_on: bool,
    pub actually_playing: bool,
    pub volume: u8,
    pub last_playback_error: Option<String>,
}

impl SessionSnapshot {
    pub fn capture(
        clock: &ClockState,
        config: &SessionConfig,
        playback: &PlaybackState,
        last_playback_error: Option<String>,
    ) -> Self {
        let total_seconds = config.total_seconds_for(clock.phase);
        let progress_pct = if total_seconds == 0 {
            0.0
        } else {
            let elapsed = total_seconds.saturating_sub(clock.remaining_seconds);
            (elapsed as f64 / total_seconds as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            phase: clock.phase,
            phase_label: clock.phase.label().to_string(),
            remaining_seconds: clock.remaining_seconds,
            remaining: format_remaining(clock.remaining_seconds),
            total_seconds,
            progress_pct,
            running: clock.running,
            work_minutes: config.work_minutes(),
            rest_minutes: config.rest_minutes(),
            audio_on: playback.desired_on,
            actually_playing: playback.actually_playing,
            volume: playback.volume,
            last_playback_error,
        }
    }
}
