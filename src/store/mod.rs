// Local persistence port
// A flat key/value text store mirroring browser local storage: read once at
// startup, written wholesale on credential and session mutations. The
// application core only ever talks to the port, never to the filesystem.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::info;

use crate::api::provider::AiProvider;
use crate::error::{AppError, Result};
use crate::models::credentials::{ApiCredential, CredentialBundle, CredentialStatus, ProviderKind};
use crate::models::session::Session;

pub type KvMap = HashMap<String, String>;

/// Persistence port; the application core depends only on this.
pub trait StoragePort {
    fn load(&self) -> Result<KvMap>;
    fn save(&self, map: &KvMap) -> Result<()>;
}

pub const KEY_CREDENTIALS: &str = "apiCredentials";
pub const KEY_SESSIONS: &str = "savedSessions";
pub const KEY_GEMINI_MODEL: &str = "selectedGeminiModel";
pub const KEY_OPENAI_MODEL: &str = "selectedOpenaiModel";
pub const KEY_PROVIDER: &str = "selectedProvider";

// Legacy single-key-per-provider format, migrated on first load
const LEGACY_KEYS: [(&str, ProviderKind); 3] = [
    ("youtubeApiKey", ProviderKind::YouTube),
    ("geminiApiKey", ProviderKind::Gemini),
    ("openaiApiKey", ProviderKind::OpenAi),
];

/// JSON file implementation of the port
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StoragePort for JsonFileStore {
    fn load(&self) -> Result<KvMap> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(KvMap::new()),
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };
        serde_json::from_str(&content).map_err(|e| AppError::Storage(e.to_string()))
    }

    fn save(&self, map: &KvMap) -> Result<()> {
        let content =
            serde_json::to_string_pretty(map).map_err(|e| AppError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| AppError::Storage(e.to_string()))
    }
}

/// In-memory double used by tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    map: std::sync::Mutex<KvMap>,
}

#[cfg(test)]
impl StoragePort for MemoryStore {
    fn load(&self) -> Result<KvMap> {
        Ok(self.map.lock().unwrap().clone())
    }

    fn save(&self, map: &KvMap) -> Result<()> {
        *self.map.lock().unwrap() = map.clone();
        Ok(())
    }
}

// Shared handle so a test can inspect the store it handed to the app
#[cfg(test)]
impl StoragePort for std::sync::Arc<MemoryStore> {
    fn load(&self) -> Result<KvMap> {
        self.as_ref().load()
    }

    fn save(&self, map: &KvMap) -> Result<()> {
        self.as_ref().save(map)
    }
}

/// Upgrade the legacy single-key-per-provider format into the consolidated
/// credential bundle: each legacy key becomes a one-entry list, marked
/// unchecked and set active. Runs only when the bundle key is absent.
/// Returns whether the map changed.
pub fn migrate_legacy_credentials(map: &mut KvMap) -> bool {
    if map.contains_key(KEY_CREDENTIALS) {
        return false;
    }

    let mut bundle = CredentialBundle::default();
    let mut migrated = false;
    for (legacy_key, kind) in LEGACY_KEYS {
        let Some(secret) = map.remove(legacy_key) else {
            continue;
        };
        if secret.is_empty() {
            continue;
        }
        let provider = bundle.provider_mut(kind);
        provider.keys.push(ApiCredential {
            id: format!("legacy-{}", legacy_key),
            key: secret,
            status: CredentialStatus::Unchecked,
        });
        provider.active_id = Some(format!("legacy-{}", legacy_key));
        migrated = true;
    }

    if migrated {
        info!("migrated legacy credential keys to the consolidated bundle");
        write_credentials(map, &bundle);
    }
    migrated
}

pub fn read_credentials(map: &KvMap) -> CredentialBundle {
    map.get(KEY_CREDENTIALS)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

pub fn write_credentials(map: &mut KvMap, bundle: &CredentialBundle) {
    if let Ok(raw) = serde_json::to_string(bundle) {
        map.insert(KEY_CREDENTIALS.to_string(), raw);
    }
}

pub fn read_sessions(map: &KvMap) -> Vec<Session> {
    map.get(KEY_SESSIONS)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

pub fn write_sessions(map: &mut KvMap, sessions: &[Session]) {
    if let Ok(raw) = serde_json::to_string(sessions) {
        map.insert(KEY_SESSIONS.to_string(), raw);
    }
}

pub fn read_provider(map: &KvMap) -> AiProvider {
    map.get(KEY_PROVIDER)
        .and_then(|raw| AiProvider::parse(raw))
        .unwrap_or(AiProvider::Gemini)
}

pub fn write_provider(map: &mut KvMap, provider: AiProvider) {
    map.insert(
        KEY_PROVIDER.to_string(),
        provider.label().to_lowercase(),
    );
}

pub fn read_model(map: &KvMap, provider: AiProvider) -> String {
    let key = match provider {
        AiProvider::Gemini => KEY_GEMINI_MODEL,
        AiProvider::OpenAi => KEY_OPENAI_MODEL,
    };
    map.get(key)
        .cloned()
        .unwrap_or_else(|| provider.default_model().to_string())
}

pub fn write_model(map: &mut KvMap, provider: AiProvider, model: &str) {
    let key = match provider {
        AiProvider::Gemini => KEY_GEMINI_MODEL,
        AiProvider::OpenAi => KEY_OPENAI_MODEL,
    };
    map.insert(key.to_string(), model.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        let mut map = store.load().unwrap();
        assert!(map.is_empty());

        map.insert("k".to_string(), "v".to_string());
        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "tubelens-store-test-{}.json",
            std::process::id()
        ));
        let store = JsonFileStore::new(&path);

        // Missing file reads as an empty map
        let mut map = store.load().unwrap();
        assert!(map.is_empty());

        map.insert("k".to_string(), "v".to_string());
        store.save(&map).unwrap();
        assert_eq!(store.load().unwrap().get("k").map(String::as_str), Some("v"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_legacy_migration_builds_one_entry_lists() {
        let mut map = KvMap::new();
        map.insert("youtubeApiKey".to_string(), "yt-secret".to_string());
        map.insert("geminiApiKey".to_string(), "gm-secret".to_string());

        assert!(migrate_legacy_credentials(&mut map));
        assert!(!map.contains_key("youtubeApiKey"));

        let bundle = read_credentials(&map);
        assert_eq!(bundle.youtube.keys.len(), 1);
        assert_eq!(bundle.youtube.keys[0].key, "yt-secret");
        assert_eq!(bundle.youtube.keys[0].status, CredentialStatus::Unchecked);
        assert_eq!(bundle.youtube.active_key(), Some("yt-secret"));
        assert_eq!(bundle.gemini.active_key(), Some("gm-secret"));
        assert!(bundle.openai.keys.is_empty());
    }

    #[test]
    fn test_migration_skipped_when_bundle_present() {
        let mut map = KvMap::new();
        write_credentials(&mut map, &CredentialBundle::default());
        map.insert("youtubeApiKey".to_string(), "stale".to_string());

        assert!(!migrate_legacy_credentials(&mut map));
        // The stale legacy key is left alone and the bundle stays empty
        let bundle = read_credentials(&map);
        assert!(bundle.youtube.keys.is_empty());
    }

    #[test]
    fn test_model_and_provider_defaults() {
        let map = KvMap::new();
        assert_eq!(read_provider(&map), AiProvider::Gemini);
        assert_eq!(read_model(&map, AiProvider::Gemini), "gemini-2.5-flash");
        assert_eq!(read_model(&map, AiProvider::OpenAi), "gpt-3.5-turbo");

        let mut map = map;
        write_provider(&mut map, AiProvider::OpenAi);
        write_model(&mut map, AiProvider::OpenAi, "gpt-4o-mini");
        assert_eq!(read_provider(&map), AiProvider::OpenAi);
        assert_eq!(read_model(&map, AiProvider::OpenAi), "gpt-4o-mini");
    }
}
