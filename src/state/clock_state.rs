//! Clock state structure and phase definitions

use serde::{Deserialize, Serialize};

/// One of the two alternating modes of a focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Rest,
            Phase::Rest => Phase::Work,
        }
    }

    /// Human-readable label shown next to the countdown
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work Time",
            Phase::Rest => "Rest Time",
        }
    }
}

/// Countdown state for the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub running: bool,
}

impl ClockState {
    /// A paused clock at the start of the given phase
    pub fn fresh(phase: Phase, total_seconds: u64) -> Self {
        Self {
            phase,
            remaining_seconds: total_seconds,
            running: false,
        }
    }
}

/// Render seconds as `MM:SS`.
///
/// Minutes are not wrapped at 60, so a 90-minute phase shows `90:00`.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
