pub mod backend;
pub mod controller;
pub mod engine;
pub mod events;
pub mod failover;
#[cfg(feature = "gstreamer")]
pub mod gst;

pub use backend::{EventSender, MediaBackend};
pub use controller::{PlaybackController, PlayerError, TransportState, WatchdogDirective};
pub use engine::{Player, PlayerClosed, PlayerSettings, WATCHDOG_TIMEOUT};
pub use events::{PlayerIntent, PlayerSnapshot, TransportEvent, TransportEventKind};
pub use failover::{on_fatal_error, step_back, step_forward, FailoverDecision};
