pub mod admin;
pub mod config;
pub mod logging;
pub mod player;
pub mod prayer;
pub mod storage;
pub mod streams;
pub mod transport;

pub use config::{AppConfig, ConfigStore, StreamEntry, CONFIG_STORAGE_KEY, MAX_STREAMS};
pub use player::{Player, PlayerSettings, PlayerSnapshot};
pub use streams::{playable_candidates, StreamCandidate};
pub use transport::{select_transport, PlatformCapabilities, TransportKind};
