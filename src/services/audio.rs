//! Ambient audio through an external player process

use std::{
    io,
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Arc, Mutex},
    time::Duration,
};
use futures::FutureExt;
use tokio::{
    process::{Child, Command},
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{
    engine::{AudioChannel, StartFuture},
    error::PlaybackError,
};

/// How long a freshly spawned player must survive to count as started
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// Upper bound on a write to the player's control socket
const CONTROL_TIMEOUT: Duration = Duration::from_millis(200);

/// Audio channel that loops one file with an external player (mpv-compatible flags).
///
/// The player is started with a JSON IPC control socket, so a gain change
/// while it runs is sent as a `set_property volume` command. The gain is also
/// kept for the next spawn.
#[derive(Debug)]
pub struct PlayerChannel {
    player: String,
    source: Option<PathBuf>,
    control: PathBuf,
    gain: f32,
    child: Arc<Mutex<Option<Child>>>,
}

impl PlayerChannel {
    pub fn new(player: impl Into<String>, source: Option<PathBuf>) -> Self {
        Self {
            player: player.into(),
            source,
            control: std::env::temp_dir().join(format!("focus-buddy-{}.sock", std::process::id())),
            gain: 0.5,
            child: Arc::new(Mutex::new(None)),
        }
    }

    fn volume_percent(&self) -> u32 {
        (self.gain * 100.0).round() as u32
    }

    fn volume_arg(&self) -> String {
        format!("--volume={}", self.volume_percent())
    }

    fn has_live_player(&self) -> bool {
        self.child.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Re-level the running player through its control socket
    #[cfg(unix)]
    fn send_volume(&self) -> io::Result<()> {
        use std::{io::Write, os::unix::net::UnixStream};

        let mut stream = UnixStream::connect(&self.control)?;
        stream.set_write_timeout(Some(CONTROL_TIMEOUT))?;
        let command = serde_json::json!({ "command": ["set_property", "volume", self.volume_percent()] });
        writeln!(stream, "{}", command)?;
        debug!("Ambient player re-leveled to {}", self.volume_percent());
        Ok(())
    }

    #[cfg(not(unix))]
    fn send_volume(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "live volume changes need a unix control socket",
        ))
    }

    fn spawn(&self, source: &Path) -> Result<Child, PlaybackError> {
        debug!("Spawning {} for {}", self.player, source.display());

        let child = Command::new(&self.player)
            .args(["--no-video", "--loop-file=inf", "--really-quiet"])
            .arg(self.volume_arg())
            .arg(format!("--input-ipc-server={}", self.control.display()))
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        Ok(child)
    }
}

impl AudioChannel for PlayerChannel {
    fn begin(&mut self) -> StartFuture {
        let Some(source) = self.source.clone() else {
            return futures::future::ready(Err(PlaybackError::NoSource)).boxed();
        };

        self.halt();
        let child = match self.spawn(&source) {
            Ok(child) => child,
            Err(e) => return futures::future::ready(Err(e)).boxed(),
        };
        let pid = child.id();
        match self.child.lock() {
            Ok(mut slot) => *slot = Some(child),
            Err(e) => {
                return futures::future::ready(Err(PlaybackError::Refused(format!(
                    "player slot poisoned: {}",
                    e
                ))))
                .boxed()
            }
        }

        confirm_started(Arc::clone(&self.child), pid).boxed()
    }

    fn halt(&mut self) {
        let child = match self.child.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                warn!("Failed to lock player slot: {}", e);
                return;
            }
        };

        if let Some(mut child) = child {
            debug!("Stopping ambient player (pid {:?})", child.id());
            if let Err(e) = child.start_kill() {
                warn!("Failed to stop ambient player: {}", e);
            }
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
        if !self.has_live_player() {
            return;
        }
        if let Err(e) = self.send_volume() {
            warn!("Failed to re-level ambient player: {}", e);
        }
    }
}

impl Drop for PlayerChannel {
    fn drop(&mut self) {
        self.halt();
        let _ = std::fs::remove_file(&self.control);
    }
}

fn wait_failed(e: io::Error) -> PlaybackError {
    PlaybackError::Refused(format!("could not poll player: {}", e))
}

/// Resolve once the player has survived its startup grace period
async fn confirm_started(
    slot: Arc<Mutex<Option<Child>>>,
    pid: Option<u32>,
) -> Result<(), PlaybackError> {
    sleep(STARTUP_GRACE).await;

    let mut slot = slot
        .lock()
        .map_err(|e| PlaybackError::Refused(format!("player slot poisoned: {}", e)))?;

    // Halted or replaced in the meantime; the session decides what that means
    let Some(child) = slot.as_mut().filter(|c| c.id() == pid) else {
        return Ok(());
    };

    match child.try_wait().map_err(wait_failed)? {
        None => {
            info!("Ambient player running (pid {:?})", pid);
            Ok(())
        }
        Some(status) => {
            *slot = None;
            Err(PlaybackError::Refused(format!("player exited early with {}", status)))
        }
    }
}

/// Check that the configured player binary can be executed
pub async fn check_player_available(player: &str) -> Result<(), String> {
    Command::new(player)
        .arg("--version")
        .output()
        .await
        .map_err(|_| format!("{} is not available; ambient audio will stay silent", player))?;

    info!("{} is available", player);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_source_fails_without_spawning() {
        let mut channel = PlayerChannel::new("mpv", None);
        let result = channel.begin().await;
        assert!(matches!(result, Err(PlaybackError::NoSource)));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let mut channel = PlayerChannel::new(
            "focus-buddy-no-such-player",
            Some(PathBuf::from("rain.mp3")),
        );
        let result = channel.begin().await;
        assert!(matches!(result, Err(PlaybackError::Spawn(_))));
    }

    #[test]
    fn gain_is_clamped_and_rendered_as_percent() {
        let mut channel = PlayerChannel::new("mpv", None);
        channel.set_gain(0.37);
        assert_eq!(channel.volume_arg(), "--volume=37");
        channel.set_gain(3.0);
        assert_eq!(channel.volume_arg(), "--volume=100");
    }

    #[test]
    fn poll_failure_is_not_reported_as_spawn_failure() {
        let error = wait_failed(io::Error::other("interrupted"));
        assert!(matches!(error, PlaybackError::Refused(_)));
        assert!(error.to_string().contains("interrupted"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn gain_change_reaches_a_running_player() {
        use std::io::{BufRead, BufReader};
        use std::os::unix::net::UnixListener;

        let control = std::env::temp_dir().join(format!("focus-buddy-gain-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&control);
        let listener = UnixListener::bind(&control).unwrap();

        let mut channel = PlayerChannel::new("mpv", Some(PathBuf::from("rain.mp3")));
        channel.control = control.clone();
        let stand_in = Command::new("sleep").arg("30").kill_on_drop(true).spawn().unwrap();
        *channel.child.lock().unwrap() = Some(stand_in);

        channel.set_gain(0.8);

        let (stream, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).unwrap();
        let command: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(command, serde_json::json!({ "command": ["set_property", "volume", 80] }));
        assert_eq!(channel.volume_arg(), "--volume=80");

        channel.halt();
    }

    #[tokio::test]
    async fn halting_a_silent_channel_is_harmless() {
        let mut channel = PlayerChannel::new("mpv", None);
        channel.halt();
        channel.halt();
    }
}
