//! Focus session façade.
//!
//! Composes the config store, clock and playback controller into the one
//! surface the UI layer calls. Every change to `running`, the phase or either
//! duration bumps [`FocusSession::epoch`]; the owner of the periodic driver
//! re-arms it whenever the epoch moves.

use tracing::{debug, info};

use super::clock::{SessionClock, TickOutcome};
use super::playback::{AudioChannel, PendingStart, PlaybackController, StartResolution};
use crate::error::{PlaybackError, Rejection};
use crate::state::{Phase, PlaybackState, SessionConfig, SessionSnapshot};

pub struct FocusSession<C> {
    config: SessionConfig,
    clock: SessionClock,
    playback: PlaybackController<C>,
    epoch: u64,
}

impl<C: AudioChannel> FocusSession<C> {
    pub fn new(config: SessionConfig, volume: u8, channel: C) -> Self {
        Self {
            clock: SessionClock::new(&config),
            config,
            playback: PlaybackController::new(channel, volume),
            epoch: 0,
        }
    }

    // Queries

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.clock.remaining_seconds()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn playback(&self) -> &PlaybackState {
        self.playback.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            self.clock.state(),
            &self.config,
            self.playback.state(),
            self.playback.last_error().map(str::to_string),
        )
    }

    // Commands

    /// Toggle between running and paused
    pub fn start_pause(&mut self) -> Option<PendingStart> {
        if self.clock.is_running() {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    pub fn start(&mut self) -> Option<PendingStart> {
        if !self.clock.start() {
            return None;
        }
        self.bump();
        info!(
            "Session started: {:?} with {}s left",
            self.clock.phase(),
            self.clock.remaining_seconds()
        );
        self.playback.clock_started()
    }

    pub fn pause(&mut self) {
        if self.clock.pause() {
            self.bump();
            info!("Session paused with {}s left", self.clock.remaining_seconds());
        }
        self.playback.clock_stopped();
    }

    /// Stop and refill the current phase
    pub fn reset(&mut self) {
        self.clock.reset(&self.config);
        self.playback.clock_stopped();
        self.bump();
        info!("Session reset: {:?} back to {}s", self.clock.phase(), self.clock.remaining_seconds());
    }

    pub fn set_work_minutes(&mut self, minutes: i64) -> Result<(), Rejection> {
        self.set_minutes(Phase::Work, minutes)
    }

    pub fn set_rest_minutes(&mut self, minutes: i64) -> Result<(), Rejection> {
        self.set_minutes(Phase::Rest, minutes)
    }

    pub fn toggle_audio(&mut self) -> Option<PendingStart> {
        self.playback.toggle_desired(self.clock.is_running())
    }

    pub fn set_volume(&mut self, volume: i64) -> Result<(), Rejection> {
        self.playback.set_volume(volume).inspect_err(|e| {
            debug!("Volume change rejected: {}", e);
        })
    }

    /// Deliver one periodic tick
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.clock.tick(&self.config);
        if let TickOutcome::RolledOver(flip) = outcome {
            self.bump();
            info!("Phase rollover: {:?} -> {:?} ({}s)", flip.from, flip.to, flip.total_seconds);
        }
        outcome
    }

    /// Report the outcome of a start request returned by an earlier command
    pub fn playback_resolved(
        &mut self,
        attempt: u64,
        result: Result<(), PlaybackError>,
    ) -> StartResolution {
        self.playback.resolve(attempt, result, self.clock.is_running())
    }

    /// Silence the channel before the session is dropped
    pub fn shutdown(&mut self) {
        self.playback.shutdown();
    }

    /// Throw away all session state and start over from `config` and `volume`.
    ///
    /// Used when the user logs out or leaves the page; the audio channel
    /// itself is kept.
    pub fn discard(&mut self, config: SessionConfig, volume: u8) {
        self.playback.reset(volume);
        self.config = config;
        self.clock = SessionClock::new(&self.config);
        self.bump();
        info!("Session discarded");
    }

    fn set_minutes(&mut self, phase: Phase, minutes: i64) -> Result<(), Rejection> {
        self.config
            .set_minutes(phase, minutes, self.clock.is_running())
            .inspect_err(|e| debug!("{:?} duration change rejected: {}", phase, e))?;

        if phase == self.clock.phase() {
            self.clock.reinitialize(&self.config);
        }
        self.bump();
        debug!("{:?} duration set to {} minutes", phase, minutes);
        Ok(())
    }

    fn bump(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::playback::tests::ScriptedChannel;
    use futures::FutureExt;

    fn session(work: u32, rest: u32) -> (FocusSession<ScriptedChannel>, ScriptedChannel) {
        let channel = ScriptedChannel::default();
        (FocusSession::new(SessionConfig::new(work, rest), 50, channel.clone()), channel)
    }

    fn settle(session: &mut FocusSession<ScriptedChannel>, pending: Option<PendingStart>) -> Option<StartResolution> {
        let pending = pending?;
        let result = pending.request.now_or_never()?;
        Some(session.playback_resolved(pending.attempt, result))
    }

    #[test]
    fn fresh_session_starts_in_full_work_phase() {
        let (session, _) = session(25, 5);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Work);
        assert_eq!(snapshot.remaining_seconds, 1500);
        assert_eq!(snapshot.remaining, "25:00");
        assert!(!snapshot.running);
        assert_eq!(snapshot.volume, 50);
    }

    #[test]
    fn start_pause_toggles_and_bumps_epoch() {
        let (mut session, _) = session(25, 5);
        let epoch = session.epoch();

        session.start_pause();
        assert!(session.is_running());
        assert!(session.epoch() > epoch);

        let epoch = session.epoch();
        session.start_pause();
        assert!(!session.is_running());
        assert!(session.epoch() > epoch);
    }

    #[test]
    fn repeated_start_does_not_bump_epoch() {
        let (mut session, _) = session(25, 5);
        session.start();
        let epoch = session.epoch();
        assert!(session.start().is_none());
        assert_eq!(session.epoch(), epoch);
    }

    #[test]
    fn durations_are_frozen_while_running() {
        let (mut session, _) = session(25, 5);
        session.start();
        assert_eq!(session.set_work_minutes(10), Err(Rejection::SessionRunning));
        assert_eq!(session.config().work_minutes(), 25);
    }

    #[test]
    fn changing_current_phase_duration_while_paused_refills_it() {
        let (mut session, _) = session(25, 5);
        session.start();
        session.tick();
        session.pause();

        session.set_work_minutes(10).unwrap();
        assert_eq!(session.remaining_seconds(), 600);

        session.set_rest_minutes(3).unwrap();
        assert_eq!(session.remaining_seconds(), 600);
    }

    #[test]
    fn rest_change_applies_at_next_rollover() {
        let (mut session, _) = session(1, 5);
        session.set_rest_minutes(2).unwrap();
        session.start();
        for _ in 0..60 {
            session.tick();
        }
        assert_eq!(session.phase(), Phase::Rest);
        assert_eq!(session.remaining_seconds(), 120);
        assert!(session.is_running());
    }

    #[test]
    fn rollover_bumps_epoch_so_driver_rearms() {
        let (mut session, _) = session(1, 1);
        session.start();
        for _ in 0..59 {
            session.tick();
        }
        let epoch = session.epoch();
        session.tick();
        assert_eq!(session.phase(), Phase::Rest);
        assert_ne!(session.epoch(), epoch);
    }

    #[test]
    fn start_with_audio_wanted_plays() {
        let (mut session, channel) = session(25, 5);
        assert!(session.toggle_audio().is_none());

        let pending = session.start_pause();
        assert_eq!(settle(&mut session, pending), Some(StartResolution::Playing));
        assert!(session.playback().actually_playing);
        assert_eq!(channel.begins(), 1);
    }

    #[test]
    fn start_without_audio_wanted_stays_silent() {
        let (mut session, channel) = session(25, 5);
        assert!(session.start_pause().is_none());
        assert!(!session.playback().actually_playing);
        assert_eq!(channel.begins(), 0);
    }

    #[test]
    fn pause_and_reset_always_silence() {
        let (mut session, _) = session(25, 5);
        session.toggle_audio();
        let pending = session.start_pause();
        settle(&mut session, pending);
        assert!(session.playback().actually_playing);

        session.pause();
        assert!(!session.playback().actually_playing);
        assert!(session.playback().desired_on);

        let pending = session.start();
        settle(&mut session, pending);
        session.reset();
        assert!(!session.playback().actually_playing);
        assert!(!session.is_running());
    }

    #[test]
    fn failed_start_is_reported_not_raised() {
        let channel = ScriptedChannel::failing("blocked");
        let mut session = FocusSession::new(SessionConfig::default(), 50, channel);
        session.toggle_audio();
        let pending = session.start_pause();

        assert!(matches!(settle(&mut session, pending), Some(StartResolution::Failed(_))));
        let snapshot = session.snapshot();
        assert!(snapshot.running);
        assert!(!snapshot.audio_on);
        assert!(!snapshot.actually_playing);
        assert!(snapshot.last_playback_error.is_some());
    }

    #[test]
    fn discard_returns_to_defaults_and_silences() {
        let (mut session, channel) = session(25, 5);
        session.set_work_minutes(40).unwrap();
        session.toggle_audio();
        let pending = session.start();
        settle(&mut session, pending);
        session.tick();

        session.discard(SessionConfig::default(), 50);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.work_minutes, 25);
        assert_eq!(snapshot.remaining_seconds, 1500);
        assert!(!snapshot.running);
        assert!(!snapshot.audio_on);
        assert!(!snapshot.actually_playing);
        assert!(channel.halts() >= 1);
    }

    #[test]
    fn default_scenario_from_start_to_rest_and_back_to_pause() {
        let (mut session, _) = session(25, 5);
        session.toggle_audio();
        let pending = session.start();
        settle(&mut session, pending);

        for _ in 0..1500 {
            session.tick();
        }
        assert_eq!(session.phase(), Phase::Rest);
        assert_eq!(session.remaining_seconds(), 300);

        session.pause();
        assert!(!session.playback().actually_playing);

        assert_eq!(session.set_volume(150), Err(Rejection::VolumeOutOfRange(150)));
        assert_eq!(session.playback().volume, 50);
    }
}
