//! # Engine registry
//!
//! The single construction entry point for everything engine-related. The
//! registry maps an engine identifier to three independently constructible
//! component factories: the engine itself, its config repository, and its
//! voice repository, so callers select a provider at runtime without
//! knowing any concrete types.
//!
//! The mapping is built lazily, at most once per process, and every read
//! after initialization is lock-free against the immutable snapshot
//! (`OnceLock` carries exactly that guarantee). Unknown identifiers yield
//! `None`; a factory that fails is logged and also yields `None`. Nothing
//! in here panics on a caller's behalf.

mod base;
pub mod qwen3;
pub mod seed_tts2;

pub use base::{
    real_voice_name, AudioChunk, AudioConfig, EngineDescriptor, EngineError, EngineResult,
    SynthesisCallback, SynthesisParams, TtsEngine, VOICE_NAME_SEPARATOR,
};

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::core::store::{
    ConfigStore, EngineConfigRepository, Qwen3ConfigRepository, SeedTts2ConfigRepository,
};
use crate::core::voices::{Qwen3VoiceRepository, SeedTts2VoiceRepository, VoiceRepository};

type EngineCtor = fn(Duration) -> EngineResult<Box<dyn TtsEngine>>;
type ConfigRepoCtor = fn(ConfigStore) -> EngineResult<Box<dyn EngineConfigRepository>>;
type VoiceRepoCtor = fn() -> EngineResult<Box<dyn VoiceRepository>>;

/// The three constructors recorded for one engine identifier.
struct ComponentFactories {
    descriptor: EngineDescriptor,
    create_engine: EngineCtor,
    create_config_repo: ConfigRepoCtor,
    create_voice_repo: VoiceRepoCtor,
}

static REGISTRY: OnceLock<HashMap<&'static str, ComponentFactories>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, ComponentFactories> {
    REGISTRY.get_or_init(build_registry)
}

fn build_registry() -> HashMap<&'static str, ComponentFactories> {
    debug!("engine registry: initializing");
    let mut map: HashMap<&'static str, ComponentFactories> = HashMap::new();

    map.insert(
        qwen3::ENGINE_ID,
        ComponentFactories {
            descriptor: qwen3::descriptor(),
            create_engine: new_qwen3_engine,
            create_config_repo: new_qwen3_config_repo,
            create_voice_repo: new_qwen3_voice_repo,
        },
    );
    map.insert(
        seed_tts2::ENGINE_ID,
        ComponentFactories {
            descriptor: seed_tts2::descriptor(),
            create_engine: new_seed_tts2_engine,
            create_config_repo: new_seed_tts2_config_repo,
            create_voice_repo: new_seed_tts2_voice_repo,
        },
    );

    info!("engine registry: {} engines registered", map.len());
    map
}

fn new_qwen3_engine(request_timeout: Duration) -> EngineResult<Box<dyn TtsEngine>> {
    Ok(Box::new(qwen3::Qwen3TtsEngine::new(request_timeout)?))
}

fn new_qwen3_config_repo(store: ConfigStore) -> EngineResult<Box<dyn EngineConfigRepository>> {
    Ok(Box::new(Qwen3ConfigRepository::new(store)))
}

fn new_qwen3_voice_repo() -> EngineResult<Box<dyn VoiceRepository>> {
    Ok(Box::new(Qwen3VoiceRepository::new()))
}

fn new_seed_tts2_engine(request_timeout: Duration) -> EngineResult<Box<dyn TtsEngine>> {
    Ok(Box::new(seed_tts2::SeedTts2Engine::new(request_timeout)?))
}

fn new_seed_tts2_config_repo(store: ConfigStore) -> EngineResult<Box<dyn EngineConfigRepository>> {
    Ok(Box::new(SeedTts2ConfigRepository::new(store)))
}

fn new_seed_tts2_voice_repo() -> EngineResult<Box<dyn VoiceRepository>> {
    Ok(Box::new(SeedTts2VoiceRepository::new()))
}

/// Create an engine instance for the given identifier.
///
/// Returns `None` for unknown identifiers and for construction failures;
/// the latter are logged, never propagated.
pub fn create_engine(engine_id: &str, request_timeout: Duration) -> Option<Box<dyn TtsEngine>> {
    let factories = match registry().get(engine_id) {
        Some(factories) => factories,
        None => {
            warn!("engine registry: engine not found - {engine_id}");
            return None;
        }
    };
    match (factories.create_engine)(request_timeout) {
        Ok(engine) => Some(engine),
        Err(e) => {
            error!("engine registry: failed to create engine {engine_id}: {e}");
            None
        }
    }
}

/// Create the config repository for the given engine identifier.
pub fn create_config_repository(
    engine_id: &str,
    store: &ConfigStore,
) -> Option<Box<dyn EngineConfigRepository>> {
    let factories = registry().get(engine_id)?;
    match (factories.create_config_repo)(store.clone()) {
        Ok(repo) => Some(repo),
        Err(e) => {
            error!("engine registry: failed to create config repo for {engine_id}: {e}");
            None
        }
    }
}

/// Create the voice repository for the given engine identifier.
pub fn create_voice_repository(engine_id: &str) -> Option<Box<dyn VoiceRepository>> {
    let factories = registry().get(engine_id)?;
    match (factories.create_voice_repo)() {
        Ok(repo) => Some(repo),
        Err(e) => {
            error!("engine registry: failed to create voice repo for {engine_id}: {e}");
            None
        }
    }
}

/// Whether an engine identifier is known to the registry.
pub fn is_registered(engine_id: &str) -> bool {
    registry().contains_key(engine_id)
}

/// Descriptor for a registered engine identifier.
pub fn descriptor(engine_id: &str) -> Option<EngineDescriptor> {
    registry().get(engine_id).map(|f| f.descriptor.clone())
}

/// Descriptors of every registered engine, sorted by identifier.
pub fn registered_engines() -> Vec<EngineDescriptor> {
    let mut engines: Vec<EngineDescriptor> =
        registry().values().map(|f| f.descriptor.clone()).collect();
    engines.sort_by(|a, b| a.id.cmp(&b.id));
    engines
}
