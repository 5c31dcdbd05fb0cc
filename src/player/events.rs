use serde::Serialize;

use crate::streams::StreamCandidate;

/// Everything the bound transport (or its watchdog) can report back.
/// Every event is tagged with the generation of the binding that produced
/// it; events from a torn-down binding are discarded on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(generation: u64, kind: TransportEventKind) -> Self {
        Self { generation, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Segmented manifest parsed (adaptive/native transports).
    ManifestReady,
    /// The element can start playback (direct transport).
    CanPlay,
    /// The element is producing audio.
    Playing,
    /// The element paused.
    Paused,
    /// The runtime refused the play request.
    PlayRejected(String),
    /// The transport gave up on the current source.
    TransportFatal(String),
    /// The bare element errored with no adaptive transport attached.
    ElementError(String),
    /// Recoverable network stall; the transport keeps loading on request.
    NetworkStall,
    /// The loading watchdog elapsed without reaching playback.
    WatchdogFired,
}

/// User-facing intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerIntent {
    Play,
    Pause,
    Next,
    Previous,
    ReplaceCandidates(Vec<StreamCandidate>),
    Shutdown,
}

/// Read-only view the presentation layer renders. Recomputed after every
/// state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub title: Option<String>,
    #[serde(rename = "isPlaying")]
    pub is_playing: bool,
    #[serde(rename = "isLoading")]
    pub is_loading: bool,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
    #[serde(rename = "candidateCount")]
    pub candidate_count: usize,
}
