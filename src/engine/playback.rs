//! Playback controller.
//!
//! Keeps one ambient audio channel consistent with the user's intent and the
//! clock's running flag. Starting a channel is asynchronous: `begin` hands
//! back a future tagged with an attempt id, the owner drives it, and reports
//! the result through [`PlaybackController::resolve`]. Resolution is judged
//! against the state at that moment, not the state when the request was made.

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Rejection};
use crate::state::{PlaybackState, MAX_VOLUME};

/// Future that settles once the channel knows whether playback began
pub type StartFuture = BoxFuture<'static, Result<(), PlaybackError>>;

/// A single looping audio output.
pub trait AudioChannel: Send {
    /// Ask the channel to start looping. Must not block.
    fn begin(&mut self) -> StartFuture;

    /// Stop any sound immediately. Stopping a silent channel is a no-op.
    fn halt(&mut self);

    /// Gain in `0.0..=1.0`. Applies at once, including to sound already playing.
    fn set_gain(&mut self, gain: f32);
}

/// A start request the owner must drive to completion
pub struct PendingStart {
    pub attempt: u64,
    pub request: StartFuture,
}

impl std::fmt::Debug for PendingStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStart")
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

/// How a finished start request was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResolution {
    /// Sound is on
    Playing,
    /// The start succeeded but audio is no longer wanted, so it was stopped again
    Silenced,
    /// The start failed; intent was switched off
    Failed(String),
    /// A newer request or a stop superseded this one
    Superseded,
}

pub struct PlaybackController<C> {
    channel: C,
    state: PlaybackState,
    next_attempt: u64,
    in_flight: Option<u64>,
    last_error: Option<String>,
}

impl<C: AudioChannel> PlaybackController<C> {
    pub fn new(mut channel: C, volume: u8) -> Self {
        let state = PlaybackState::new(volume);
        channel.set_gain(state.gain());
        Self {
            channel,
            state,
            next_attempt: 0,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Message from the most recent failed start, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Flip the user's intent and bring the channel in line with it
    pub fn toggle_desired(&mut self, running: bool) -> Option<PendingStart> {
        self.state.desired_on = !self.state.desired_on;
        debug!("Ambient audio intent set to: {}", self.state.desired_on);

        if self.state.desired_on && running {
            self.begin()
        } else {
            self.stop();
            None
        }
    }

    pub fn set_volume(&mut self, volume: i64) -> Result<(), Rejection> {
        let volume = u8::try_from(volume)
            .ok()
            .filter(|v| *v <= MAX_VOLUME)
            .ok_or(Rejection::VolumeOutOfRange(volume))?;

        self.state.volume = volume;
        self.channel.set_gain(self.state.gain());
        Ok(())
    }

    /// The clock went from paused to running
    pub fn clock_started(&mut self) -> Option<PendingStart> {
        if self.state.desired_on {
            self.begin()
        } else {
            None
        }
    }

    /// The clock stopped. Pausing always silences the ambience.
    pub fn clock_stopped(&mut self) {
        self.stop();
    }

    /// Apply the outcome of start request `attempt`.
    pub fn resolve(
        &mut self,
        attempt: u64,
        result: Result<(), PlaybackError>,
        running: bool,
    ) -> StartResolution {
        if self.in_flight != Some(attempt) {
            // Nothing newer owns the channel, so make sure a late success stays quiet
            if result.is_ok() && self.in_flight.is_none() && !self.state.actually_playing {
                self.channel.halt();
            }
            debug!("Ignoring superseded playback start #{}", attempt);
            return StartResolution::Superseded;
        }
        self.in_flight = None;

        match result {
            Ok(()) if running && self.state.desired_on => {
                self.state.actually_playing = true;
                self.last_error = None;
                info!("Ambient audio playing");
                StartResolution::Playing
            }
            Ok(()) => {
                self.channel.halt();
                self.state.actually_playing = false;
                StartResolution::Silenced
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Ambient audio failed to start: {}", message);
                self.state.actually_playing = false;
                self.state.desired_on = false;
                self.last_error = Some(message.clone());
                StartResolution::Failed(message)
            }
        }
    }

    /// Stop the channel for good, e.g. when the session is discarded
    pub fn shutdown(&mut self) {
        self.stop();
    }

    /// Silence the channel and forget intent, volume and errors.
    ///
    /// Attempt ids keep counting so starts issued before the reset resolve
    /// as superseded.
    pub fn reset(&mut self, volume: u8) {
        self.stop();
        self.state = PlaybackState::new(volume);
        self.last_error = None;
        self.channel.set_gain(self.state.gain());
    }

    fn begin(&mut self) -> Option<PendingStart> {
        if self.state.actually_playing || self.in_flight.is_some() {
            return None;
        }
        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.in_flight = Some(attempt);
        debug!("Requesting ambient audio start #{}", attempt);

        Some(PendingStart {
            attempt,
            request: self.channel.begin(),
        })
    }

    fn stop(&mut self) {
        self.in_flight = None;
        self.state.actually_playing = false;
        self.channel.halt();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    pub(crate) struct ChannelLog {
        pub begins: usize,
        pub halts: usize,
        pub gain: f32,
        pub fail_with: Option<String>,
    }

    /// Channel that records calls and settles starts immediately
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedChannel {
        pub log: Arc<Mutex<ChannelLog>>,
    }

    impl ScriptedChannel {
        pub fn failing(message: &str) -> Self {
            let channel = Self::default();
            channel.log.lock().unwrap().fail_with = Some(message.to_string());
            channel
        }

        pub fn begins(&self) -> usize {
            self.log.lock().unwrap().begins
        }

        pub fn halts(&self) -> usize {
            self.log.lock().unwrap().halts
        }

        pub fn gain(&self) -> f32 {
            self.log.lock().unwrap().gain
        }
    }

    impl AudioChannel for ScriptedChannel {
        fn begin(&mut self) -> StartFuture {
            let mut log = self.log.lock().unwrap();
            log.begins += 1;
            let result = match &log.fail_with {
                Some(message) => Err(PlaybackError::Refused(message.clone())),
                None => Ok(()),
            };
            futures::future::ready(result).boxed()
        }

        fn halt(&mut self) {
            self.log.lock().unwrap().halts += 1;
        }

        fn set_gain(&mut self, gain: f32) {
            self.log.lock().unwrap().gain = gain;
        }
    }

    fn settle(controller: &mut PlaybackController<ScriptedChannel>, pending: PendingStart, running: bool) -> StartResolution {
        let result = pending.request.now_or_never().expect("scripted start settles immediately");
        controller.resolve(pending.attempt, result, running)
    }

    #[test]
    fn toggling_while_paused_only_changes_intent() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);

        assert!(controller.toggle_desired(false).is_none());
        assert!(controller.state().desired_on);
        assert!(!controller.state().actually_playing);
        assert_eq!(channel.begins(), 0);
    }

    #[test]
    fn toggling_on_while_running_starts_playback() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);

        let pending = controller.toggle_desired(true).expect("start requested");
        assert_eq!(settle(&mut controller, pending, true), StartResolution::Playing);
        assert!(controller.state().actually_playing);

        assert!(controller.toggle_desired(true).is_none());
        assert!(!controller.state().actually_playing);
        assert_eq!(channel.halts(), 1);
    }

    #[test]
    fn clock_stop_silences_regardless_of_intent() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);
        controller.toggle_desired(false);
        let pending = controller.clock_started().expect("start requested");
        settle(&mut controller, pending, true);

        controller.clock_stopped();
        assert!(!controller.state().actually_playing);
        assert!(controller.state().desired_on);
    }

    #[test]
    fn clock_start_without_intent_stays_silent() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);
        assert!(controller.clock_started().is_none());
        assert_eq!(channel.begins(), 0);
    }

    #[test]
    fn late_success_after_stop_is_silenced() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);
        controller.toggle_desired(false);
        let pending = controller.clock_started().expect("start requested");

        controller.clock_stopped();
        let halts_before = channel.halts();
        assert_eq!(settle(&mut controller, pending, false), StartResolution::Superseded);
        assert!(!controller.state().actually_playing);
        assert_eq!(channel.halts(), halts_before + 1);
    }

    #[test]
    fn failure_reconciles_intent_and_records_error() {
        let channel = ScriptedChannel::failing("needs a user gesture");
        let mut controller = PlaybackController::new(channel, 50);

        let pending = controller.toggle_desired(true).expect("start requested");
        let resolution = settle(&mut controller, pending, true);

        assert!(matches!(resolution, StartResolution::Failed(_)));
        assert!(!controller.state().desired_on);
        assert!(!controller.state().actually_playing);
        assert!(controller.last_error().unwrap().contains("user gesture"));
    }

    #[test]
    fn volume_is_validated_and_applied_to_gain() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);
        assert!((channel.gain() - 0.5).abs() < f32::EPSILON);

        assert_eq!(controller.set_volume(150), Err(Rejection::VolumeOutOfRange(150)));
        assert_eq!(controller.set_volume(-1), Err(Rejection::VolumeOutOfRange(-1)));
        assert_eq!(controller.state().volume, 50);

        controller.set_volume(80).unwrap();
        assert_eq!(controller.state().volume, 80);
        assert!((channel.gain() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn volume_change_while_playing_reaches_the_live_channel() {
        let channel = ScriptedChannel::default();
        let mut controller = PlaybackController::new(channel.clone(), 50);
        let pending = controller.toggle_desired(true).expect("start requested");
        settle(&mut controller, pending, true);

        controller.set_volume(20).unwrap();
        assert!(controller.state().actually_playing);
        assert!((channel.gain() - 0.2).abs() < f32::EPSILON);
        assert_eq!(channel.begins(), 1);
    }
}
