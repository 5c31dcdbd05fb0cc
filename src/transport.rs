use serde::Serialize;
use url::Url;

/// How audio bytes reach the playback element for one candidate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TransportKind {
    /// A segmented-manifest client drives the element (hls.js-style).
    AdaptiveSegmented,
    /// The platform element plays the segmented manifest natively.
    NativePlatform,
    /// The address is assigned as the element source directly.
    Direct,
}

/// Static runtime capabilities, injected so the selection stays a pure
/// function and tests can exercise every branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// An adaptive-segment client library is present in the runtime.
    pub adaptive_client: bool,
    /// The native media element reports support for segmented manifests.
    pub native_adaptive: bool,
}

/// Purely syntactic manifest detection; no network probing. Stream
/// operators either publish an `.m3u8`/`.m3u` path or embed the manifest
/// media type in the address.
pub fn is_adaptive_manifest(address: &str) -> bool {
    let lowered = address.to_ascii_lowercase();
    if let Ok(parsed) = Url::parse(&lowered) {
        let ext = parsed.path().rsplit('.').next().unwrap_or("");
        if matches!(ext, "m3u8" | "m3u") {
            return true;
        }
    }
    lowered.contains("m3u8") || lowered.contains("mpegurl") || lowered.contains("format=hls")
}

pub fn select_transport(address: &str, capabilities: PlatformCapabilities) -> TransportKind {
    let manifest = is_adaptive_manifest(address);
    if capabilities.adaptive_client && manifest {
        TransportKind::AdaptiveSegmented
    } else if capabilities.native_adaptive && manifest {
        TransportKind::NativePlatform
    } else {
        TransportKind::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: PlatformCapabilities = PlatformCapabilities {
        adaptive_client: true,
        native_adaptive: true,
    };
    const NATIVE_ONLY: PlatformCapabilities = PlatformCapabilities {
        adaptive_client: false,
        native_adaptive: true,
    };
    const NONE: PlatformCapabilities = PlatformCapabilities {
        adaptive_client: false,
        native_adaptive: false,
    };

    #[test]
    fn detects_manifest_addresses() {
        assert!(is_adaptive_manifest("https://cdn.example/live/radio.m3u8"));
        assert!(is_adaptive_manifest("https://cdn.example/live/radio.M3U8"));
        assert!(is_adaptive_manifest("https://cdn.example/playlist.m3u"));
        assert!(is_adaptive_manifest(
            "https://cdn.example/stream?type=application/vnd.apple.mpegurl"
        ));
        assert!(is_adaptive_manifest("https://cdn.example/live?format=hls"));
        assert!(!is_adaptive_manifest("https://cdn.example/stream.mp3"));
        assert!(!is_adaptive_manifest("https://stream.zeno.fm/ztmkyozjspltv"));
    }

    #[test]
    fn prefers_the_adaptive_client_for_manifests() {
        assert_eq!(
            select_transport("https://cdn.example/live.m3u8", FULL),
            TransportKind::AdaptiveSegmented
        );
    }

    #[test]
    fn falls_back_to_native_playback_when_no_client_is_available() {
        assert_eq!(
            select_transport("https://cdn.example/live.m3u8", NATIVE_ONLY),
            TransportKind::NativePlatform
        );
    }

    #[test]
    fn direct_for_plain_audio_or_capability_less_runtimes() {
        assert_eq!(
            select_transport("https://cdn.example/stream.mp3", FULL),
            TransportKind::Direct
        );
        assert_eq!(
            select_transport("https://cdn.example/live.m3u8", NONE),
            TransportKind::Direct
        );
    }
}
