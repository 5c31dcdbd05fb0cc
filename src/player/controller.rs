use serde_json::json;
use thiserror::Error;

use crate::logging::logger;
use crate::player::backend::MediaBackend;
use crate::player::events::{PlayerSnapshot, TransportEvent, TransportEventKind};
use crate::player::failover::{self, FailoverDecision};
use crate::streams::StreamCandidate;
use crate::transport::{select_transport, PlatformCapabilities};

/// Playback failures. The display strings are the user-visible messages;
/// only exhausted sessions ever surface one (transient failures roll over
/// to the next candidate silently).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("No stream URL configured.")]
    NoCandidates,
    #[error("Stream connection timed out.")]
    BindingTimeout,
    #[error("Stream unavailable.")]
    TransportFatal(String),
    #[error("Playback request was rejected.")]
    PlayRejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Binding,
    Ready,
    Playing,
    Paused,
    Failed,
}

/// What the caller must do with the loading watchdog after a transition.
/// The timer is a cancellable resource owned alongside the binding; `Arm`
/// carries the generation the fire event must be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogDirective {
    Arm(u64),
    Disarm,
    Keep,
}

/// The playback state machine. Owns the current candidate index, the play
/// intent, and the one live transport binding; everything asynchronous
/// (element events, transport signals, the watchdog) enters through
/// [`handle_event`](Self::handle_event) tagged with a binding generation,
/// and stale generations are discarded.
pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    capabilities: PlatformCapabilities,
    candidates: Vec<StreamCandidate>,
    current: usize,
    generation: u64,
    bound: bool,
    state: TransportState,
    play_intent: bool,
    play_pending: bool,
    last_error: Option<PlayerError>,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(
        backend: B,
        capabilities: PlatformCapabilities,
        candidates: Vec<StreamCandidate>,
    ) -> Self {
        let mut controller = Self {
            backend,
            capabilities,
            candidates,
            current: 0,
            generation: 0,
            bound: false,
            state: TransportState::Idle,
            play_intent: false,
            play_pending: false,
            last_error: None,
        };
        if controller.candidates.is_empty() {
            controller.state = TransportState::Failed;
            controller.last_error = Some(PlayerError::NoCandidates);
        }
        controller
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn play_intent(&self) -> bool {
        self.play_intent
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            title: self.candidates.get(self.current).map(|c| c.title.clone()),
            is_playing: self.state == TransportState::Playing,
            is_loading: self.play_pending
                || (self.state == TransportState::Binding && self.play_intent),
            error_message: self.last_error.as_ref().map(|e| e.to_string()),
            candidate_count: self.candidates.len(),
        }
    }

    pub fn play(&mut self) -> WatchdogDirective {
        if self.candidates.is_empty() {
            self.state = TransportState::Failed;
            self.last_error = Some(PlayerError::NoCandidates);
            return WatchdogDirective::Disarm;
        }
        self.play_intent = true;
        match self.state {
            TransportState::Idle | TransportState::Failed => {
                self.bind_current();
                WatchdogDirective::Arm(self.generation)
            }
            // The binding is still loading; playback starts once it is
            // ready, but the clock on the whole attempt starts now.
            TransportState::Binding => WatchdogDirective::Arm(self.generation),
            TransportState::Ready | TransportState::Paused => {
                self.backend.request_play(self.generation);
                self.play_pending = true;
                WatchdogDirective::Arm(self.generation)
            }
            TransportState::Playing => WatchdogDirective::Keep,
        }
    }

    pub fn pause(&mut self) -> WatchdogDirective {
        self.play_intent = false;
        self.play_pending = false;
        if self.state == TransportState::Playing {
            self.backend.pause();
            self.state = TransportState::Paused;
        }
        WatchdogDirective::Disarm
    }

    pub fn next(&mut self) -> WatchdogDirective {
        self.skip_to(failover::step_forward(
            self.current,
            self.candidates.len().max(1),
        ))
    }

    pub fn previous(&mut self) -> WatchdogDirective {
        self.skip_to(failover::step_back(
            self.current,
            self.candidates.len().max(1),
        ))
    }

    fn skip_to(&mut self, index: usize) -> WatchdogDirective {
        if self.candidates.is_empty() {
            return WatchdogDirective::Keep;
        }
        self.current = index;
        self.play_intent = true;
        self.bind_current();
        WatchdogDirective::Arm(self.generation)
    }

    /// The configuration changed: the candidate list is replaced wholesale
    /// and the session starts over at index 0.
    pub fn replace_candidates(&mut self, candidates: Vec<StreamCandidate>) -> WatchdogDirective {
        self.release_binding();
        self.candidates = candidates;
        self.current = 0;
        self.play_intent = false;
        self.play_pending = false;
        self.last_error = None;
        if self.candidates.is_empty() {
            self.state = TransportState::Failed;
            self.last_error = Some(PlayerError::NoCandidates);
        } else {
            self.state = TransportState::Idle;
        }
        WatchdogDirective::Disarm
    }

    /// Session teardown; the binding is released on this path too.
    pub fn shutdown(&mut self) -> WatchdogDirective {
        self.release_binding();
        self.state = TransportState::Idle;
        self.play_intent = false;
        self.play_pending = false;
        WatchdogDirective::Disarm
    }

    pub fn handle_event(&mut self, event: TransportEvent) -> WatchdogDirective {
        if event.generation != self.generation {
            logger().debug(
                "player.event.stale",
                json!({
                    "eventGeneration": event.generation,
                    "currentGeneration": self.generation,
                }),
            );
            return WatchdogDirective::Keep;
        }
        match event.kind {
            TransportEventKind::ManifestReady | TransportEventKind::CanPlay => {
                if self.state == TransportState::Binding {
                    self.state = TransportState::Ready;
                    if self.play_intent {
                        self.backend.request_play(self.generation);
                        self.play_pending = true;
                    }
                }
                WatchdogDirective::Keep
            }
            TransportEventKind::Playing => {
                self.state = TransportState::Playing;
                self.play_pending = false;
                self.last_error = None;
                WatchdogDirective::Disarm
            }
            TransportEventKind::Paused => {
                if self.state == TransportState::Playing {
                    self.state = TransportState::Paused;
                }
                WatchdogDirective::Keep
            }
            TransportEventKind::NetworkStall => {
                // The transport self-heals; just tell it to keep loading.
                self.backend.recover(self.generation);
                WatchdogDirective::Keep
            }
            TransportEventKind::PlayRejected(reason) => {
                self.fail(PlayerError::PlayRejected(reason))
            }
            TransportEventKind::TransportFatal(reason)
            | TransportEventKind::ElementError(reason) => {
                self.fail(PlayerError::TransportFatal(reason))
            }
            TransportEventKind::WatchdogFired => {
                if matches!(
                    self.state,
                    TransportState::Playing | TransportState::Failed
                ) {
                    return WatchdogDirective::Keep;
                }
                self.play_intent = false;
                self.fail(PlayerError::BindingTimeout)
            }
        }
    }

    fn fail(&mut self, error: PlayerError) -> WatchdogDirective {
        logger().warn(
            "player.transport_failed",
            json!({
                "candidate": self.candidates.get(self.current).map(|c| c.id.clone()),
                "generation": self.generation,
                "error": format!("{error:?}"),
            }),
        );
        self.state = TransportState::Failed;
        self.play_pending = false;
        self.last_error = Some(error);

        match failover::on_fatal_error(self.candidates.len(), self.current) {
            FailoverDecision::Advance(next) => {
                logger().info(
                    "player.failover.advance",
                    json!({
                        "fromIndex": self.current,
                        "toIndex": next,
                    }),
                );
                self.current = next;
                self.play_intent = true;
                self.bind_current();
                WatchdogDirective::Arm(self.generation)
            }
            FailoverDecision::Exhausted => {
                logger().warn(
                    "player.failover.exhausted",
                    json!({ "candidateCount": self.candidates.len() }),
                );
                self.play_intent = false;
                WatchdogDirective::Disarm
            }
        }
    }

    /// Bind the current candidate. The previous binding is always released
    /// first so a destroyed transport can never feed events into the new
    /// one; the generation tag catches anything already in flight.
    fn bind_current(&mut self) {
        self.release_binding();
        self.generation += 1;
        self.state = TransportState::Binding;
        self.play_pending = false;
        self.last_error = None;

        let candidate = &self.candidates[self.current];
        let kind = select_transport(&candidate.url, self.capabilities);
        logger().info(
            "player.bind",
            json!({
                "candidate": candidate.id,
                "title": candidate.title,
                "transport": kind,
                "generation": self.generation,
            }),
        );
        self.backend.attach(&candidate.url, kind, self.generation);
        self.bound = true;
    }

    fn release_binding(&mut self) {
        if self.bound {
            self.backend.detach(self.generation);
            self.bound = false;
        }
    }
}
