use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gstreamer as gst;
use gstreamer::prelude::*;
use serde_json::json;

use crate::logging::logger;
use crate::player::backend::{EventSender, MediaBackend};
use crate::player::events::{TransportEvent, TransportEventKind};
use crate::transport::TransportKind;

/// Playback element backed by a GStreamer `playbin`. One playbin per
/// binding; `detach` drives it to `Null` and stops the bus watcher before
/// the next candidate is attached.
pub struct GstBackend {
    events: Option<EventSender>,
    binding: Option<Binding>,
}

struct Binding {
    playbin: gst::Element,
    stop: Arc<AtomicBool>,
}

impl GstBackend {
    pub fn new() -> anyhow::Result<Self> {
        gst::init()?;
        Ok(Self {
            events: None,
            binding: None,
        })
    }

    fn teardown(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.stop.store(true, Ordering::Relaxed);
            let _ = binding.playbin.set_state(gst::State::Null);
        }
    }

    fn send(&self, generation: u64, kind: TransportEventKind) {
        if let Some(events) = &self.events {
            let _ = events.blocking_send(TransportEvent::new(generation, kind));
        }
    }
}

impl MediaBackend for GstBackend {
    fn connect(&mut self, events: EventSender) {
        self.events = Some(events);
    }

    fn attach(&mut self, url: &str, kind: TransportKind, generation: u64) {
        self.teardown();
        let Some(events) = self.events.clone() else {
            return;
        };

        let playbin = match gst::ElementFactory::make("playbin")
            .name("radio-playbin")
            .property("uri", url)
            .build()
        {
            Ok(element) => element,
            Err(err) => {
                logger().warn(
                    "player.gst.build_failed",
                    json!({ "error": format!("{err:?}") }),
                );
                self.send(
                    generation,
                    TransportEventKind::TransportFatal(format!("playbin build failed: {err:?}")),
                );
                return;
            }
        };

        let stop = Arc::new(AtomicBool::new(false));

        // Watch the bus before any state change so no early signal is lost.
        if let Some(bus) = playbin.bus() {
            let watcher_stop = stop.clone();
            let watcher_playbin = playbin.clone();
            std::thread::spawn(move || {
                watch_bus(bus, watcher_playbin, events, generation, kind, watcher_stop);
            });
        }

        // Preroll paused; AsyncDone on the bus reports readiness.
        if playbin.set_state(gst::State::Paused).is_err() {
            self.send(
                generation,
                TransportEventKind::TransportFatal("failed to preroll pipeline".to_string()),
            );
            stop.store(true, Ordering::Relaxed);
            let _ = playbin.set_state(gst::State::Null);
            return;
        }

        self.binding = Some(Binding { playbin, stop });
    }

    fn request_play(&mut self, generation: u64) {
        let Some(binding) = &self.binding else {
            return;
        };
        if binding.playbin.set_state(gst::State::Playing).is_err() {
            self.send(
                generation,
                TransportEventKind::PlayRejected("pipeline refused to play".to_string()),
            );
        }
    }

    fn pause(&mut self) {
        if let Some(binding) = &self.binding {
            let _ = binding.playbin.set_state(gst::State::Paused);
        }
    }

    fn recover(&mut self, _generation: u64) {
        if let Some(binding) = &self.binding {
            let _ = binding.playbin.set_state(gst::State::Playing);
        }
    }

    fn detach(&mut self, _generation: u64) {
        self.teardown();
    }
}

fn watch_bus(
    bus: gst::Bus,
    playbin: gst::Element,
    events: EventSender,
    generation: u64,
    kind: TransportKind,
    stop: Arc<AtomicBool>,
) {
    let ready_kind = match kind {
        TransportKind::Direct => TransportEventKind::CanPlay,
        _ => TransportEventKind::ManifestReady,
    };
    let mut reported_ready = false;

    while !stop.load(Ordering::Relaxed) {
        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(250)) else {
            continue;
        };
        match msg.view() {
            gst::MessageView::AsyncDone(..) => {
                if !reported_ready {
                    reported_ready = true;
                    let _ =
                        events.blocking_send(TransportEvent::new(generation, ready_kind.clone()));
                }
            }
            gst::MessageView::StateChanged(state) => {
                let from_playbin = msg
                    .src()
                    .map(|src| src == playbin.upcast_ref::<gst::Object>())
                    .unwrap_or(false);
                if from_playbin {
                    match state.current() {
                        gst::State::Playing => {
                            let _ = events.blocking_send(TransportEvent::new(
                                generation,
                                TransportEventKind::Playing,
                            ));
                        }
                        gst::State::Paused => {
                            let _ = events.blocking_send(TransportEvent::new(
                                generation,
                                TransportEventKind::Paused,
                            ));
                        }
                        _ => {}
                    }
                }
            }
            gst::MessageView::Buffering(buffering) => {
                if buffering.percent() < 100 {
                    let _ = events.blocking_send(TransportEvent::new(
                        generation,
                        TransportEventKind::NetworkStall,
                    ));
                }
            }
            gst::MessageView::Eos(..) => {
                let _ = events.blocking_send(TransportEvent::new(
                    generation,
                    TransportEventKind::ElementError("end of stream".to_string()),
                ));
                break;
            }
            gst::MessageView::Error(err) => {
                let _ = events.blocking_send(TransportEvent::new(
                    generation,
                    TransportEventKind::TransportFatal(format!("{:?}", err.error())),
                ));
                break;
            }
            _ => {}
        }
    }
}
