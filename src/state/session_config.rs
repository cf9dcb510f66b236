//! Work/rest duration configuration

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::error::Rejection;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_REST_MINUTES: u32 = 5;

/// User-chosen Work and Rest durations, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    work_minutes: u32,
    rest_minutes: u32,
}

impl SessionConfig {
    /// Create a config from already-validated durations.
    ///
    /// Zero is bumped to one minute so a phase can never be empty.
    pub fn new(work_minutes: u32, rest_minutes: u32) -> Self {
        Self {
            work_minutes: work_minutes.max(1),
            rest_minutes: rest_minutes.max(1),
        }
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn rest_minutes(&self) -> u32 {
        self.rest_minutes
    }

    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Rest => self.rest_minutes,
        }
    }

    /// Fresh duration of a phase under the current config
    pub fn total_seconds_for(&self, phase: Phase) -> u64 {
        u64::from(self.minutes_for(phase)) * 60
    }

    /// Set the duration of one phase.
    ///
    /// Rejected outright while the clock runs; otherwise only positive values
    /// that fit in `u32` are accepted.
    pub fn set_minutes(&mut self, phase: Phase, minutes: i64, running: bool) -> Result<(), Rejection> {
        if running {
            return Err(Rejection::SessionRunning);
        }
        let minutes = validate_minutes(minutes)?;
        match phase {
            Phase::Work => self.work_minutes = minutes,
            Phase::Rest => self.rest_minutes = minutes,
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_REST_MINUTES)
    }
}

fn validate_minutes(minutes: i64) -> Result<u32, Rejection> {
    if minutes <= 0 {
        return Err(Rejection::NotPositive(minutes));
    }
    u32::try_from(minutes).map_err(|_| Rejection::MinutesOutOfRange(minutes))
}

/// Parse a raw text field the way a number input would.
///
/// Surrounding whitespace is ignored; anything else that is not an integer
/// is rejected.
pub fn parse_minutes(raw: &str) -> Result<i64, Rejection> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Rejection::NotNumeric(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5() {
        let config = SessionConfig::default();
        assert_eq!(config.work_minutes(), 25);
        assert_eq!(config.rest_minutes(), 5);
        assert_eq!(config.total_seconds_for(Phase::Work), 1500);
        assert_eq!(config.total_seconds_for(Phase::Rest), 300);
    }

    #[test]
    fn rejects_non_positive_and_keeps_prior_value() {
        let mut config = SessionConfig::default();
        assert_eq!(config.set_minutes(Phase::Work, 0, false), Err(Rejection::NotPositive(0)));
        assert_eq!(config.set_minutes(Phase::Rest, -3, false), Err(Rejection::NotPositive(-3)));
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn rejects_any_write_while_running() {
        let mut config = SessionConfig::default();
        assert_eq!(config.set_minutes(Phase::Work, 10, true), Err(Rejection::SessionRunning));
        assert_eq!(config.work_minutes(), 25);
    }

    #[test]
    fn rejects_values_too_large_for_u32() {
        let mut config = SessionConfig::default();
        let too_long = i64::from(u32::MAX) + 1;
        assert_eq!(
            config.set_minutes(Phase::Work, too_long, false),
            Err(Rejection::MinutesOutOfRange(too_long))
        );
        assert_eq!(config.work_minutes(), 25);
    }

    #[test]
    fn parse_minutes_accepts_trimmed_integers_only() {
        assert_eq!(parse_minutes(" 15 "), Ok(15));
        assert_eq!(parse_minutes("-2"), Ok(-2));
        assert!(matches!(parse_minutes("abc"), Err(Rejection::NotNumeric(_))));
        assert!(matches!(parse_minutes("2.5"), Err(Rejection::NotNumeric(_))));
        assert!(matches!(parse_minutes(""), Err(Rejection::NotNumeric(_))));
    }
}
