use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::logging::logger;
use crate::storage::{Storage, StorageError};

/// Storage key the serialized record lives under. The `_v2` suffix is the
/// schema marker carried over from earlier deployments; bump it when the
/// record shape changes incompatibly.
pub const CONFIG_STORAGE_KEY: &str = "radio_iqra_config_v2";

/// Upper bound on configured streams, enforced by the editor rather than
/// the store.
pub const MAX_STREAMS: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("radio name must not be empty")]
    EmptyRadioName,
    #[error("primary color must be a #rrggbb hex code, got {0:?}")]
    InvalidColor(String),
    #[error("at most {MAX_STREAMS} streams can be configured")]
    TooManyStreams,
    #[error("stream {title:?} has an invalid address: {url:?}")]
    InvalidStreamUrl { title: String, url: String },
    #[error("no stream with id {0}")]
    UnknownStream(String),
    #[error("failed to persist configuration: {0}")]
    Persist(#[from] StorageError),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub id: String,
    pub title: String,
    #[serde(rename = "streamUrl")]
    pub url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "radioName")]
    pub radio_name: String,
    #[serde(rename = "primaryColor")]
    pub primary_color_hex: String,
    #[serde(rename = "logoUrl")]
    pub logo_url: String,
    pub streams: Vec<StreamEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            radio_name: "RADIO IQRA BF".to_string(),
            primary_color_hex: "#10B981".to_string(),
            logo_url: "https://i.pinimg.com/1200x/f6/d3/f6/f6d3f61ec150126bb68dcd3fc45aa508.jpg"
                .to_string(),
            streams: vec![StreamEntry {
                id: "default-stream".to_string(),
                title: "Direct".to_string(),
                url: "https://stream.zeno.fm/ztmkyozjspltv".to_string(),
                enabled: true,
            }],
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radio_name.trim().is_empty() {
            return Err(ConfigError::EmptyRadioName);
        }
        if !is_hex_color(&self.primary_color_hex) {
            return Err(ConfigError::InvalidColor(self.primary_color_hex.clone()));
        }
        if self.streams.len() > MAX_STREAMS {
            return Err(ConfigError::TooManyStreams);
        }
        for stream in &self.streams {
            if stream.enabled && !is_stream_address(&stream.url) {
                return Err(ConfigError::InvalidStreamUrl {
                    title: stream.title.clone(),
                    url: stream.url.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn is_stream_address(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Durable configuration access. Absence or a corrupt record is non-fatal
/// and falls back to the default record.
#[derive(Clone)]
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> AppConfig {
        let Some(raw) = self.storage.get(CONFIG_STORAGE_KEY) else {
            return AppConfig::default();
        };
        match serde_json::from_str::<AppConfig>(&raw) {
            Ok(config) => config,
            Err(err) => {
                logger().warn(
                    "config.parse_failed",
                    json!({
                        "key": CONFIG_STORAGE_KEY,
                        "error": format!("{err}"),
                    }),
                );
                AppConfig::default()
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let serialized = serde_json::to_string(config)?;
        self.storage.set(CONFIG_STORAGE_KEY, &serialized)?;
        Ok(())
    }

    pub fn reset(&self) -> Result<AppConfig, ConfigError> {
        self.storage.remove(CONFIG_STORAGE_KEY)?;
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn store() -> ConfigStore {
        ConfigStore::new(Arc::new(MemoryStorage::new()))
    }

    fn stream(id: &str, url: &str, enabled: bool) -> StreamEntry {
        StreamEntry {
            id: id.to_string(),
            title: format!("Stream {id}"),
            url: url.to_string(),
            enabled,
        }
    }

    #[test]
    fn load_falls_back_to_default_when_absent() {
        let store = store();
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn load_falls_back_to_default_on_corrupt_record() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CONFIG_STORAGE_KEY, "{not json").unwrap();
        let store = ConfigStore::new(storage);
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = store();
        let mut config = AppConfig::default();
        config.radio_name = "Test FM".to_string();
        config.streams = vec![
            stream("a", "https://streams.example/a.mp3", true),
            stream("b", "https://streams.example/b.m3u8", false),
        ];
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn reset_restores_default() {
        let store = store();
        let mut config = AppConfig::default();
        config.radio_name = "Other".to_string();
        store.save(&config).unwrap();

        let restored = store.reset().unwrap();
        assert_eq!(restored, AppConfig::default());
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn serialized_record_uses_the_persisted_field_names() {
        let value = serde_json::to_value(AppConfig::default()).unwrap();
        assert!(value.get("radioName").is_some());
        assert!(value.get("primaryColor").is_some());
        assert!(value.get("logoUrl").is_some());
        assert!(value["streams"][0].get("streamUrl").is_some());
    }

    #[test]
    fn validate_rejects_bad_color() {
        let mut config = AppConfig::default();
        config.primary_color_hex = "10B981".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(_))
        ));
        config.primary_color_hex = "#10B98".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn validate_rejects_too_many_streams() {
        let mut config = AppConfig::default();
        config.streams = (0..4)
            .map(|i| stream(&i.to_string(), "https://streams.example/a.mp3", true))
            .collect();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyStreams)
        ));
    }

    #[test]
    fn validate_rejects_enabled_stream_without_address() {
        let mut config = AppConfig::default();
        config.streams = vec![stream("a", "", true)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStreamUrl { .. })
        ));

        // A disabled entry may keep a draft address.
        config.streams = vec![stream("a", "", false)];
        assert!(config.validate().is_ok());
    }
}
