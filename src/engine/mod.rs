//! Focus-session engine
//!
//! Pure state transitions for the work/rest countdown and the ambient audio
//! bookkeeping. Nothing here sleeps, spawns or touches the filesystem; the
//! session driver task supplies ticks and drives playback start futures.

pub mod clock;
pub mod playback;
pub mod scheduler;
pub mod session;

// Re-export main types
pub use clock::{SessionClock, TickOutcome};
pub use playback::{AudioChannel, PendingStart, PlaybackController, StartFuture, StartResolution};
pub use scheduler::{rollover, Rollover};
pub use session::FocusSession;
