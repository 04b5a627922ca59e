//! # TTS engine base abstractions
//!
//! The unified interface every pluggable text-to-speech engine implements,
//! plus the value types flowing through it. Engines deliver audio and
//! failures through a [`SynthesisCallback`] rather than a return value, so a
//! streaming engine and a one-shot HTTP engine share the same surface.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::store::EngineConfig;

/// Separator inside compound voice ids: `<real voice name>::<language tag>`.
pub const VOICE_NAME_SEPARATOR: &str = "::";

/// Identifying record for a registered TTS engine.
///
/// A plain value record; the only invariant is identifier uniqueness within
/// the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Stable engine identifier, e.g. `seed-tts-2.0`
    pub id: String,
    /// Human-readable engine name
    pub name: String,
    /// Service provider behind the engine
    pub provider: String,
}

/// Output audio parameters advertised by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Audio container/encoding, e.g. "pcm", "wav", "mp3"
    pub format: &'static str,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            channels: 1,
            format: "pcm",
        }
    }
}

impl AudioConfig {
    pub fn description(&self) -> String {
        format!(
            "{} @ {} Hz, {} channel(s)",
            self.format, self.sample_rate, self.channels
        )
    }
}

/// Caller-tunable synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    /// Pitch ratio, 1.0 is the voice's natural pitch
    pub pitch: f32,
    /// Speaking rate ratio, 1.0 is normal speed
    pub speech_rate: f32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            speech_rate: 1.0,
        }
    }
}

/// One chunk of synthesized audio.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub format: String,
}

/// Engine-level error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Engine is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Text is empty")]
    EmptyText,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Engine has been released")]
    Released,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Map a transport-level reqwest failure onto an [`EngineError`].
pub(crate) fn map_transport_error(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        EngineError::Timeout(err.to_string())
    } else {
        EngineError::Network(err.to_string())
    }
}

/// Callback trait for receiving synthesis output.
pub trait SynthesisCallback: Send + Sync {
    /// Called when audio data is available.
    fn on_audio(&self, chunk: AudioChunk) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Called when synthesis fails. Terminal for the request.
    fn on_error(&self, error: EngineError) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Called when the engine has finished delivering audio.
    fn on_complete(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Extract the real voice name from a compound voice id.
///
/// `zh_female_cancan_mars_bigtts::zh-CN` yields `zh_female_cancan_mars_bigtts`;
/// an id without the separator is returned whole.
pub fn real_voice_name(voice_id: &str) -> &str {
    match voice_id.split_once(VOICE_NAME_SEPARATOR) {
        Some((name, _lang)) => name,
        None => voice_id,
    }
}

/// Unified interface for pluggable text-to-speech engines.
///
/// Engines are constructed through the registry and never report failures by
/// panicking: synthesis problems flow through the [`SynthesisCallback`], and
/// configuration questions are answered by the inspection methods.
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Identifying record for this engine.
    fn descriptor(&self) -> EngineDescriptor;

    /// Output audio parameters this engine produces.
    fn audio_config(&self) -> AudioConfig {
        AudioConfig::default()
    }

    /// Language tags this engine can synthesize.
    fn supported_languages(&self) -> &'static [&'static str];

    /// Compound voice ids (`name::lang`) this engine offers.
    fn supported_voice_ids(&self) -> Vec<String>;

    /// Pick a voice id for the given language, preferring the caller's
    /// current selection when it is non-blank.
    fn default_voice_id(&self, lang: &str, current: Option<&str>) -> String;

    /// Whether a voice id is acceptable to this engine.
    fn is_voice_id_valid(&self, voice_id: &str) -> bool {
        !real_voice_name(voice_id).trim().is_empty()
    }

    /// Whether the given configuration carries the credentials this engine
    /// needs to synthesize.
    fn is_configured(&self, config: &EngineConfig) -> bool;

    /// A fresh configuration bundle with this engine's defaults.
    fn default_config(&self) -> EngineConfig {
        EngineConfig::default()
    }

    /// Human-readable label for a configuration field, if this engine uses it.
    fn config_label(&self, key: &str) -> Option<&'static str>;

    /// Synthesize `text` and deliver audio through `callback`.
    ///
    /// All failures (guards, network, provider) are reported via
    /// `callback.on_error`; a successful run ends with `on_complete`. A
    /// synthesis cancelled through [`TtsEngine::stop`] completes silently.
    async fn synthesize(
        &self,
        text: &str,
        params: &SynthesisParams,
        config: &EngineConfig,
        callback: Arc<dyn SynthesisCallback>,
    );

    /// Cancel any in-flight synthesis.
    fn stop(&self);

    /// Release the engine. Further synthesis attempts report
    /// [`EngineError::Released`] through the callback.
    fn release(&self);

    /// Whether this engine has been released.
    fn is_released(&self) -> bool;
}
