use serde::{Deserialize, Serialize};

use super::{ConfigStore, StoreResult};
use crate::core::engine::EngineDescriptor;

const KEY_API_KEY: &str = "api_key";
const KEY_APP_ID: &str = "app_id";
const KEY_ACCESS_KEY: &str = "access_key";
const KEY_VOICE_ID: &str = "voice_id";

/// Flat per-engine configuration bundle.
///
/// Opaque strings persisted verbatim; which fields are meaningful depends on
/// the engine (an API-key engine leaves `app_id`/`access_key` empty, and so
/// on). There are no cross-field invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub voice_id: String,
}

/// Persistence boundary for per-engine credentials and settings.
///
/// Implementations own the key layout for their engine; configs for
/// different engines are isolated by key namespacing.
pub trait EngineConfigRepository: Send + Sync {
    /// Read the stored configuration for an engine. Absent fields come back
    /// as empty strings.
    fn config(&self, engine: &EngineDescriptor) -> EngineConfig;

    /// Persist the configuration for an engine.
    fn save_config(&self, engine: &EngineDescriptor, config: &EngineConfig) -> StoreResult<()>;

    /// Whether any configuration has been saved for an engine.
    fn has_config(&self, engine: &EngineDescriptor) -> bool;
}

fn prefs_key(engine: &EngineDescriptor, field: &str) -> String {
    format!("engine_{}_{}", engine.id, field)
}

/// Config repository for the Qwen3 TTS engine: API key + voice id.
pub struct Qwen3ConfigRepository {
    store: ConfigStore,
}

impl Qwen3ConfigRepository {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }
}

impl EngineConfigRepository for Qwen3ConfigRepository {
    fn config(&self, engine: &EngineDescriptor) -> EngineConfig {
        EngineConfig {
            api_key: self
                .store
                .get(&prefs_key(engine, KEY_API_KEY))
                .unwrap_or_default(),
            voice_id: self
                .store
                .get(&prefs_key(engine, KEY_VOICE_ID))
                .unwrap_or_default(),
            ..EngineConfig::default()
        }
    }

    fn save_config(&self, engine: &EngineDescriptor, config: &EngineConfig) -> StoreResult<()> {
        self.store.set_many([
            (prefs_key(engine, KEY_API_KEY), config.api_key.clone()),
            (prefs_key(engine, KEY_VOICE_ID), config.voice_id.clone()),
        ])
    }

    fn has_config(&self, engine: &EngineDescriptor) -> bool {
        self.store.contains(&prefs_key(engine, KEY_API_KEY))
            || self.store.contains(&prefs_key(engine, KEY_VOICE_ID))
    }
}

/// Config repository for the Seed TTS 2.0 engine: app id, access key, voice id.
pub struct SeedTts2ConfigRepository {
    store: ConfigStore,
}

impl SeedTts2ConfigRepository {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }
}

impl EngineConfigRepository for SeedTts2ConfigRepository {
    fn config(&self, engine: &EngineDescriptor) -> EngineConfig {
        EngineConfig {
            app_id: self
                .store
                .get(&prefs_key(engine, KEY_APP_ID))
                .unwrap_or_default(),
            access_key: self
                .store
                .get(&prefs_key(engine, KEY_ACCESS_KEY))
                .unwrap_or_default(),
            voice_id: self
                .store
                .get(&prefs_key(engine, KEY_VOICE_ID))
                .unwrap_or_default(),
            ..EngineConfig::default()
        }
    }

    fn save_config(&self, engine: &EngineDescriptor, config: &EngineConfig) -> StoreResult<()> {
        self.store.set_many([
            (prefs_key(engine, KEY_APP_ID), config.app_id.clone()),
            (prefs_key(engine, KEY_ACCESS_KEY), config.access_key.clone()),
            (prefs_key(engine, KEY_VOICE_ID), config.voice_id.clone()),
        ])
    }

    fn has_config(&self, engine: &EngineDescriptor) -> bool {
        self.store.contains(&prefs_key(engine, KEY_APP_ID))
            || self.store.contains(&prefs_key(engine, KEY_ACCESS_KEY))
            || self.store.contains(&prefs_key(engine, KEY_VOICE_ID))
    }
}
