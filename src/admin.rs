use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{AppConfig, ConfigError, ConfigStore, StreamEntry, MAX_STREAMS};

/// SHA-256 of the single shared settings credential.
const ADMIN_PASSWORD_SHA256: &str =
    "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918";

pub fn verify_password(candidate: &str) -> bool {
    hex::encode(Sha256::digest(candidate.as_bytes())) == ADMIN_PASSWORD_SHA256
}

/// Draft-based editing of the configuration record: the settings screen
/// mutates a working copy and nothing is persisted until `save`.
pub struct ConfigEditor {
    store: ConfigStore,
    draft: AppConfig,
}

impl ConfigEditor {
    pub fn new(store: ConfigStore) -> Self {
        let draft = store.load();
        Self { store, draft }
    }

    pub fn draft(&self) -> &AppConfig {
        &self.draft
    }

    pub fn set_radio_name(&mut self, name: impl Into<String>) {
        self.draft.radio_name = name.into();
    }

    pub fn set_primary_color(&mut self, hex: impl Into<String>) {
        self.draft.primary_color_hex = hex.into();
    }

    pub fn set_logo_url(&mut self, url: impl Into<String>) {
        self.draft.logo_url = url.into();
    }

    /// Appends an enabled entry and returns its generated id.
    pub fn add_stream(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<String, ConfigError> {
        if self.draft.streams.len() >= MAX_STREAMS {
            return Err(ConfigError::TooManyStreams);
        }
        let id = Uuid::new_v4().to_string();
        self.draft.streams.push(StreamEntry {
            id: id.clone(),
            title: title.into(),
            url: url.into(),
            enabled: true,
        });
        Ok(id)
    }

    pub fn update_stream(
        &mut self,
        id: &str,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let entry = self.stream_mut(id)?;
        entry.title = title.into();
        entry.url = url.into();
        Ok(())
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle_stream(&mut self, id: &str) -> Result<bool, ConfigError> {
        let entry = self.stream_mut(id)?;
        entry.enabled = !entry.enabled;
        Ok(entry.enabled)
    }

    pub fn remove_stream(&mut self, id: &str) -> Result<(), ConfigError> {
        let position = self
            .draft
            .streams
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| ConfigError::UnknownStream(id.to_string()))?;
        self.draft.streams.remove(position);
        Ok(())
    }

    /// Validate and persist the draft; the returned record is what the
    /// shell should adopt.
    pub fn save(&mut self) -> Result<AppConfig, ConfigError> {
        self.store.save(&self.draft)?;
        Ok(self.draft.clone())
    }

    pub fn reset(&mut self) -> Result<AppConfig, ConfigError> {
        self.draft = self.store.reset()?;
        Ok(self.draft.clone())
    }

    fn stream_mut(&mut self, id: &str) -> Result<&mut StreamEntry, ConfigError> {
        self.draft
            .streams
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ConfigError::UnknownStream(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn editor() -> ConfigEditor {
        ConfigEditor::new(ConfigStore::new(Arc::new(MemoryStorage::new())))
    }

    #[test]
    fn accepts_only_the_shared_credential() {
        assert!(verify_password("admin"));
        assert!(!verify_password("Admin"));
        assert!(!verify_password(""));
        assert!(!verify_password("admin "));
    }

    #[test]
    fn enforces_the_stream_cap() {
        let mut editor = editor();
        // The default record already carries one stream.
        editor
            .add_stream("Second", "https://streams.example/2.mp3")
            .unwrap();
        editor
            .add_stream("Third", "https://streams.example/3.mp3")
            .unwrap();
        assert!(matches!(
            editor.add_stream("Fourth", "https://streams.example/4.mp3"),
            Err(ConfigError::TooManyStreams)
        ));
        assert_eq!(editor.draft().streams.len(), MAX_STREAMS);
    }

    #[test]
    fn edits_stay_draft_until_saved() {
        let store = ConfigStore::new(Arc::new(MemoryStorage::new()));
        let mut editor = ConfigEditor::new(store.clone());
        editor.set_radio_name("Renamed FM");
        assert_eq!(store.load().radio_name, "RADIO IQRA BF");

        let saved = editor.save().unwrap();
        assert_eq!(saved.radio_name, "Renamed FM");
        assert_eq!(store.load().radio_name, "Renamed FM");
    }

    #[test]
    fn save_rejects_an_invalid_draft() {
        let mut editor = editor();
        editor.set_primary_color("green");
        assert!(matches!(editor.save(), Err(ConfigError::InvalidColor(_))));
    }

    #[test]
    fn stream_updates_toggle_and_removal() {
        let mut editor = editor();
        let id = editor
            .add_stream("Backup", "https://streams.example/backup.mp3")
            .unwrap();

        editor
            .update_stream(&id, "Backup HD", "https://streams.example/backup-hd.aac")
            .unwrap();
        assert_eq!(editor.toggle_stream(&id).unwrap(), false);
        assert_eq!(editor.toggle_stream(&id).unwrap(), true);

        editor.remove_stream(&id).unwrap();
        assert!(matches!(
            editor.remove_stream(&id),
            Err(ConfigError::UnknownStream(_))
        ));
    }

    #[test]
    fn reset_restores_the_default_draft() {
        let store = ConfigStore::new(Arc::new(MemoryStorage::new()));
        let mut editor = ConfigEditor::new(store.clone());
        editor.set_radio_name("Renamed FM");
        editor.save().unwrap();

        let restored = editor.reset().unwrap();
        assert_eq!(restored, AppConfig::default());
        assert_eq!(store.load(), AppConfig::default());
    }
}
