//! Phase scheduler: what happens when the countdown reaches zero

use crate::state::{ClockState, Phase, SessionConfig};

/// Record of one phase flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollover {
    pub from: Phase,
    pub to: Phase,
    pub total_seconds: u64,
}

/// Flip to the other phase and load its fresh duration.
///
/// The duration is read from `config` as it is now, so a change made during
/// the previous phase applies here and never retroactively. `running` is left
/// untouched: a running session continues straight into the next phase.
pub fn rollover(clock: &mut ClockState, config: &SessionConfig) -> Rollover {
    let from = clock.phase;
    let to = from.next();
    let total_seconds = config.total_seconds_for(to);

    clock.phase = to;
    clock.remaining_seconds = total_seconds;

    Rollover {
        from,
        to,
        total_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_rolls_into_rest_and_keeps_running() {
        let config = SessionConfig::new(25, 5);
        let mut clock = ClockState {
            phase: Phase::Work,
            remaining_seconds: 0,
            running: true,
        };

        let flip = rollover(&mut clock, &config);

        assert_eq!(flip.from, Phase::Work);
        assert_eq!(flip.to, Phase::Rest);
        assert_eq!(clock.remaining_seconds, 300);
        assert!(clock.running);
    }

    #[test]
    fn rest_rolls_into_work_with_current_config() {
        let config = SessionConfig::new(40, 5);
        let mut clock = ClockState {
            phase: Phase::Rest,
            remaining_seconds: 0,
            running: false,
        };

        rollover(&mut clock, &config);

        assert_eq!(clock.phase, Phase::Work);
        assert_eq!(clock.remaining_seconds, 40 * 60);
        assert!(!clock.running);
    }
}
