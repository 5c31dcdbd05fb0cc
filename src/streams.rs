use crate::config::{is_stream_address, AppConfig};

/// One configured, enabled audio source. Immutable for the lifetime of a
/// playback session; the list is recomputed wholesale when the
/// configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCandidate {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Enabled streams with a usable address, in configured order.
pub fn playable_candidates(config: &AppConfig) -> Vec<StreamCandidate> {
    config
        .streams
        .iter()
        .filter(|entry| entry.enabled && is_stream_address(&entry.url))
        .map(|entry| StreamCandidate {
            id: entry.id.clone(),
            title: entry.title.clone(),
            url: entry.url.clone(),
        })
        .collect()
}
