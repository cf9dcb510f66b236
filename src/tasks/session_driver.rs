//! Session driver background task
//!
//! The only owner of the [`FocusSession`]. User commands, periodic ticks and
//! playback start completions are all handled one at a time on this task, so
//! the engine needs no locking. At most one tick interval exists, and it is
//! torn down and rebuilt whenever the session's epoch moves.

use std::time::Duration;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    engine::{AudioChannel, FocusSession, PendingStart, TickOutcome},
    error::{DriverError, PlaybackError, Rejection},
    state::{SessionConfig, SessionSnapshot},
};

/// Nominal cadence of the countdown
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;

/// A user-facing mutation of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartPause,
    Reset,
    SetWorkMinutes(i64),
    SetRestMinutes(i64),
    ToggleAudio,
    SetVolume(i64),
    /// Drop all state and start over from the defaults
    Discard,
}

pub type CommandReply = Result<SessionSnapshot, Rejection>;

#[derive(Debug)]
pub struct Command {
    pub action: Action,
    pub reply: oneshot::Sender<CommandReply>,
}

/// Values a fresh or discarded session starts from
#[derive(Debug, Clone, Copy)]
pub struct SessionDefaults {
    pub config: SessionConfig,
    pub volume: u8,
}

/// Cloneable front door to the driver task
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Run an action and wait for the resulting snapshot
    pub async fn send(&self, action: Action) -> Result<CommandReply, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command { action, reply })
            .await
            .map_err(|_| DriverError)?;
        rx.await.map_err(|_| DriverError)
    }

    /// Latest published snapshot, without a round-trip to the driver
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }
}

type StartCompletion = BoxFuture<'static, (u64, Result<(), PlaybackError>)>;

enum Event {
    Command(Option<Command>),
    Tick,
    StartSettled(u64, Result<(), PlaybackError>),
}

struct SessionDriver<C> {
    session: FocusSession<C>,
    defaults: SessionDefaults,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    ticker: Option<Interval>,
    armed_epoch: u64,
    starts: FuturesUnordered<StartCompletion>,
}

/// Spawn the driver for a new session built from `defaults`
pub fn spawn_session_driver<C>(channel: C, defaults: SessionDefaults) -> (SessionHandle, JoinHandle<()>)
where
    C: AudioChannel + 'static,
{
    let session = FocusSession::new(defaults.config, defaults.volume, channel);
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());

    let driver = SessionDriver {
        armed_epoch: session.epoch(),
        session,
        defaults,
        commands: commands_rx,
        snapshots: snapshots_tx,
        ticker: None,
        starts: FuturesUnordered::new(),
    };
    let task = tokio::spawn(driver.run());

    (
        SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
        },
        task,
    )
}

impl<C: AudioChannel> SessionDriver<C> {
    async fn run(mut self) {
        info!("Starting session driver task");

        loop {
            let event = tokio::select! {
                command = self.commands.recv() => Event::Command(command),
                _ = next_tick(&mut self.ticker) => Event::Tick,
                Some((attempt, result)) = self.starts.next(), if !self.starts.is_empty() => {
                    Event::StartSettled(attempt, result)
                }
            };

            match event {
                Event::Command(Some(command)) => {
                    let reply = self.apply(command.action);
                    self.rearm_if_needed();
                    self.publish();
                    // The caller may have given up waiting
                    let _ = command.reply.send(reply);
                }
                Event::Command(None) => break,
                Event::Tick => {
                    if let TickOutcome::Ignored = self.session.tick() {
                        debug!("Dropped a tick delivered while paused");
                    }
                    self.rearm_if_needed();
                    self.publish();
                }
                Event::StartSettled(attempt, result) => {
                    let resolution = self.session.playback_resolved(attempt, result);
                    debug!("Playback start #{} settled: {:?}", attempt, resolution);
                    self.publish();
                }
            }
        }

        self.session.shutdown();
        info!("Session driver stopped");
    }

    fn apply(&mut self, action: Action) -> CommandReply {
        let pending = match action {
            Action::StartPause => self.session.start_pause(),
            Action::Reset => {
                self.session.reset();
                None
            }
            Action::SetWorkMinutes(minutes) => {
                self.session.set_work_minutes(minutes)?;
                None
            }
            Action::SetRestMinutes(minutes) => {
                self.session.set_rest_minutes(minutes)?;
                None
            }
            Action::ToggleAudio => self.session.toggle_audio(),
            Action::SetVolume(volume) => {
                self.session.set_volume(volume)?;
                None
            }
            Action::Discard => {
                self.session.discard(self.defaults.config, self.defaults.volume);
                None
            }
        };

        if let Some(PendingStart { attempt, request }) = pending {
            self.starts
                .push(request.map(move |result| (attempt, result)).boxed());
        }

        Ok(self.session.snapshot())
    }

    /// Replace the tick interval if running, phase or durations changed
    fn rearm_if_needed(&mut self) {
        let epoch = self.session.epoch();
        if epoch == self.armed_epoch {
            return;
        }
        self.armed_epoch = epoch;

        self.ticker = self.session.is_running().then(|| {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        debug!(
            "Tick driver re-armed (epoch {}, active={})",
            epoch,
            self.ticker.is_some()
        );
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
