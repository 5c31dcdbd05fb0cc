use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::logging::logger;
use crate::player::backend::MediaBackend;
use crate::player::controller::{PlaybackController, WatchdogDirective};
use crate::player::events::{PlayerIntent, PlayerSnapshot, TransportEvent, TransportEventKind};
use crate::streams::StreamCandidate;
use crate::transport::PlatformCapabilities;

/// How long a play attempt may sit in loading before it is failed.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(10);

const EVENT_CHANNEL_CAPACITY: usize = 32;
const INTENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub capabilities: PlatformCapabilities,
    pub watchdog_timeout: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            capabilities: PlatformCapabilities::default(),
            watchdog_timeout: WATCHDOG_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
#[error("player task is no longer running")]
pub struct PlayerClosed;

/// Handle to a running playback session. Intents go in through bounded
/// channels; state comes back as [`PlayerSnapshot`] values on a watch
/// channel, so the presentation layer always sees the latest transition.
pub struct Player {
    intents: mpsc::Sender<PlayerIntent>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    task: JoinHandle<()>,
}

impl Player {
    pub fn spawn<B>(
        mut backend: B,
        candidates: Vec<StreamCandidate>,
        settings: PlayerSettings,
    ) -> Self
    where
        B: MediaBackend + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        backend.connect(event_tx.clone());
        let controller = PlaybackController::new(backend, settings.capabilities, candidates);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);

        let task = tokio::spawn(run_player(
            controller,
            intent_rx,
            event_rx,
            event_tx,
            snapshot_tx,
            settings.watchdog_timeout,
        ));

        Self {
            intents: intent_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    pub async fn play(&self) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::Play).await
    }

    pub async fn pause(&self) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::Pause).await
    }

    pub async fn next(&self) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::Next).await
    }

    pub async fn previous(&self) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::Previous).await
    }

    /// Swap in a freshly derived candidate list after a config change.
    pub async fn replace_candidates(
        &self,
        candidates: Vec<StreamCandidate>,
    ) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::ReplaceCandidates(candidates)).await
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn snapshots(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot_stream(&self) -> WatchStream<PlayerSnapshot> {
        WatchStream::new(self.snapshots.clone())
    }

    pub async fn shutdown(self) -> Result<(), PlayerClosed> {
        self.send(PlayerIntent::Shutdown).await?;
        let _ = self.task.await;
        Ok(())
    }

    async fn send(&self, intent: PlayerIntent) -> Result<(), PlayerClosed> {
        self.intents.send(intent).await.map_err(|_| PlayerClosed)
    }
}

async fn run_player<B: MediaBackend>(
    mut controller: PlaybackController<B>,
    mut intents: mpsc::Receiver<PlayerIntent>,
    mut events: mpsc::Receiver<TransportEvent>,
    event_tx: mpsc::Sender<TransportEvent>,
    snapshots: watch::Sender<PlayerSnapshot>,
    watchdog_timeout: Duration,
) {
    let mut watchdog: Option<JoinHandle<()>> = None;

    loop {
        let directive = tokio::select! {
            intent = intents.recv() => match intent {
                None | Some(PlayerIntent::Shutdown) => break,
                Some(PlayerIntent::Play) => controller.play(),
                Some(PlayerIntent::Pause) => controller.pause(),
                Some(PlayerIntent::Next) => controller.next(),
                Some(PlayerIntent::Previous) => controller.previous(),
                Some(PlayerIntent::ReplaceCandidates(candidates)) => {
                    controller.replace_candidates(candidates)
                }
            },
            event = events.recv() => match event {
                None => break,
                Some(event) => controller.handle_event(event),
            },
        };

        match directive {
            WatchdogDirective::Arm(generation) => {
                cancel(&mut watchdog);
                let fire = event_tx.clone();
                watchdog = Some(tokio::spawn(async move {
                    tokio::time::sleep(watchdog_timeout).await;
                    let _ = fire
                        .send(TransportEvent::new(
                            generation,
                            TransportEventKind::WatchdogFired,
                        ))
                        .await;
                }));
            }
            WatchdogDirective::Disarm => cancel(&mut watchdog),
            WatchdogDirective::Keep => {}
        }

        snapshots.send_replace(controller.snapshot());
    }

    cancel(&mut watchdog);
    controller.shutdown();
    snapshots.send_replace(controller.snapshot());
    logger().info("player.stopped", json!({}));
}

fn cancel(watchdog: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = watchdog.take() {
        handle.abort();
    }
}
