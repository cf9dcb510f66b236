//! Session clock.
//!
//! A second-granularity countdown with no internal timer. The owner of the
//! clock delivers `tick()` at a nominal 1 Hz while it runs; a tick delivered
//! while paused is ignored.
//!
//! ```text
//! paused --start--> running --pause/reset--> paused
//!                      |
//!                    tick (remaining hits 0) --> rollover, still running
//! ```

use super::scheduler::{self, Rollover};
use crate::state::{ClockState, Phase, SessionConfig};

/// What a single tick did to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock was paused; nothing changed
    Ignored,
    /// One second elapsed
    Counted { remaining_seconds: u64 },
    /// The countdown reached zero and the next phase was loaded
    RolledOver(Rollover),
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
}

impl SessionClock {
    /// A paused clock at the start of a Work phase
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: ClockState::fresh(Phase::Work, config.total_seconds_for(Phase::Work)),
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Returns `true` if the clock was paused before.
    pub fn start(&mut self) -> bool {
        let changed = !self.state.running;
        self.state.running = true;
        changed
    }

    /// Returns `true` if the clock was running before.
    pub fn pause(&mut self) -> bool {
        let changed = self.state.running;
        self.state.running = false;
        changed
    }

    /// Stop and refill the current phase. The phase itself is kept.
    pub fn reset(&mut self, config: &SessionConfig) {
        self.state.running = false;
        self.state.remaining_seconds = config.total_seconds_for(self.state.phase);
    }

    /// Refill the current phase after its configured duration changed.
    ///
    /// Only allowed while paused; a running countdown is never rewritten.
    pub fn reinitialize(&mut self, config: &SessionConfig) -> bool {
        if self.state.running {
            return false;
        }
        self.state.remaining_seconds = config.total_seconds_for(self.state.phase);
        true
    }

    /// Advance by one second.
    ///
    /// Reaching zero hands over to the scheduler within the same call, so the
    /// next tick always lands in a phase with time left.
    pub fn tick(&mut self, config: &SessionConfig) -> TickOutcome {
        if !self.state.running {
            return TickOutcome::Ignored;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            return TickOutcome::RolledOver(scheduler::rollover(&mut self.state, config));
        }

        TickOutcome::Counted {
            remaining_seconds: self.state.remaining_seconds,
        }
    }
}
