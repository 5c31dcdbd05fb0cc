use tokio::sync::mpsc;

use crate::player::events::TransportEvent;
use crate::transport::TransportKind;

pub type EventSender = mpsc::Sender<TransportEvent>;

/// The single media element plus its per-candidate transport binding,
/// exclusively owned by the playback controller. Commands are
/// fire-and-forget; outcomes come back as [`TransportEvent`]s tagged with
/// the generation passed in here.
pub trait MediaBackend {
    /// Wire up the event channel before the first `attach`.
    fn connect(&mut self, events: EventSender);

    /// Bind a candidate address. For [`TransportKind::AdaptiveSegmented`]
    /// the implementation must subscribe to manifest-ready and fatal-error
    /// signals before attaching media, so no early signal is lost.
    fn attach(&mut self, url: &str, kind: TransportKind, generation: u64);

    /// Ask the element to start playback. Emits `Playing` on success and
    /// `PlayRejected` when the runtime refuses.
    fn request_play(&mut self, generation: u64);

    /// Pause is synchronous and does not fail.
    fn pause(&mut self);

    /// Non-fatal stall: tell the transport to continue loading.
    fn recover(&mut self, generation: u64);

    /// Release the binding. Synchronous; events from this generation that
    /// are already in flight are discarded by the controller.
    fn detach(&mut self, generation: u64);
}
