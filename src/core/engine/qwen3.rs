//! # Qwen3 TTS engine (Alibaba Cloud Bailian)
//!
//! Synthesis through the DashScope multimodal generation API with bearer-key
//! authentication. The response carries the audio either inline as base64 or
//! as a short-lived URL, in which case the bytes are fetched in a second
//! request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::base::{
    map_transport_error, real_voice_name, AudioChunk, AudioConfig, EngineDescriptor, EngineError,
    EngineResult, SynthesisCallback, SynthesisParams, TtsEngine, VOICE_NAME_SEPARATOR,
};
use crate::core::store::EngineConfig;

pub const ENGINE_ID: &str = "qwen3-tts";
pub const ENGINE_NAME: &str = "Qwen3 TTS";
pub const PROVIDER_NAME: &str = "Alibaba Cloud Bailian";

const SYNTHESIS_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation/generation";
const MODEL: &str = "qwen3-tts-flash";
const SAMPLE_RATE: u32 = 24000;

const SUPPORTED_LANGUAGES: &[&str] = &["zh", "zh-CN", "en", "en-US"];
const DEFAULT_VOICE: &str = "Cherry";

const VOICE_IDS: &[&str] = &["Cherry", "Serena", "Ethan", "Chelsie"];

pub fn descriptor() -> EngineDescriptor {
    EngineDescriptor {
        id: ENGINE_ID.to_string(),
        name: ENGINE_NAME.to_string(),
        provider: PROVIDER_NAME.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct DashScopeResponse {
    output: Option<DashScopeOutput>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashScopeOutput {
    audio: Option<DashScopeAudio>,
}

#[derive(Debug, Deserialize)]
struct DashScopeAudio {
    /// Inline base64 audio, present for small responses
    data: Option<String>,
    /// Short-lived download URL, the usual delivery path
    url: Option<String>,
}

/// Alibaba Cloud Bailian Qwen3 TTS implementation.
pub struct Qwen3TtsEngine {
    client: reqwest::Client,
    cancelled: AtomicBool,
    released: AtomicBool,
}

impl Qwen3TtsEngine {
    pub fn new(request_timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()
            .map_err(|e| EngineError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            cancelled: AtomicBool::new(false),
            released: AtomicBool::new(false),
        })
    }

    fn build_request_body(&self, text: &str, config: &EngineConfig) -> serde_json::Value {
        let voice = if config.voice_id.is_empty() {
            DEFAULT_VOICE
        } else {
            real_voice_name(&config.voice_id)
        };
        json!({
            "model": MODEL,
            "input": {
                "text": text,
                "voice": voice,
            },
        })
    }

    async fn run_synthesis(&self, text: &str, config: &EngineConfig) -> EngineResult<Vec<u8>> {
        let body = self.build_request_body(text, config);
        let response = self
            .client
            .post(SYNTHESIS_URL)
            .header(AUTHORIZATION, format!("Bearer {}", config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let payload: DashScopeResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Internal(format!("Malformed provider response: {e}")))?;

        if !status.is_success() {
            return Err(EngineError::Provider {
                code: i64::from(status.as_u16()),
                message: format!(
                    "{}: {}",
                    payload.code.unwrap_or_default(),
                    payload.message.unwrap_or_default()
                ),
            });
        }

        let audio = payload
            .output
            .and_then(|output| output.audio)
            .ok_or_else(|| EngineError::Internal("Response carried no audio".to_string()))?;

        if let Some(encoded) = audio.data {
            return BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| EngineError::Internal(format!("Invalid base64 audio payload: {e}")));
        }

        let url = audio
            .url
            .ok_or_else(|| EngineError::Internal("Response carried no audio".to_string()))?;
        debug!("{ENGINE_ID}: fetching audio from {url}");
        let audio_response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        if !audio_response.status().is_success() {
            return Err(EngineError::Provider {
                code: i64::from(audio_response.status().as_u16()),
                message: "Audio download failed".to_string(),
            });
        }
        let bytes = audio_response.bytes().await.map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TtsEngine for Qwen3TtsEngine {
    fn descriptor(&self) -> EngineDescriptor {
        descriptor()
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: SAMPLE_RATE,
            channels: 1,
            format: "wav",
        }
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        SUPPORTED_LANGUAGES
    }

    fn supported_voice_ids(&self) -> Vec<String> {
        let mut voices = Vec::with_capacity(VOICE_IDS.len() * SUPPORTED_LANGUAGES.len());
        for lang in SUPPORTED_LANGUAGES {
            for voice_id in VOICE_IDS {
                voices.push(format!("{voice_id}{VOICE_NAME_SEPARATOR}{lang}"));
            }
        }
        voices
    }

    fn default_voice_id(&self, lang: &str, current: Option<&str>) -> String {
        match current {
            Some(voice) if !voice.trim().is_empty() => {
                format!("{voice}{VOICE_NAME_SEPARATOR}{lang}")
            }
            _ => format!("{DEFAULT_VOICE}{VOICE_NAME_SEPARATOR}{lang}"),
        }
    }

    fn is_configured(&self, config: &EngineConfig) -> bool {
        let configured = !config.api_key.trim().is_empty();
        debug!("{ENGINE_ID}: is_configured = {configured}");
        configured
    }

    fn config_label(&self, key: &str) -> Option<&'static str> {
        match key {
            "api_key" => Some("API Key"),
            "voice_id" => Some("Voice"),
            _ => None,
        }
    }

    async fn synthesize(
        &self,
        text: &str,
        _params: &SynthesisParams,
        config: &EngineConfig,
        callback: Arc<dyn SynthesisCallback>,
    ) {
        if self.released.load(Ordering::Acquire) {
            warn!("{ENGINE_ID}: synthesize called after release");
            callback.on_error(EngineError::Released).await;
            return;
        }
        if config.api_key.is_empty() {
            callback
                .on_error(EngineError::NotConfigured("API Key is missing".to_string()))
                .await;
            return;
        }
        if text.is_empty() {
            callback.on_error(EngineError::EmptyText).await;
            return;
        }

        info!("{ENGINE_ID}: starting synthesis, text length {}", text.len());
        self.cancelled.store(false, Ordering::Release);

        match self.run_synthesis(text, config).await {
            Ok(audio) => {
                if self.cancelled.load(Ordering::Acquire) {
                    info!("{ENGINE_ID}: synthesis cancelled, discarding audio");
                    callback.on_complete().await;
                    return;
                }
                callback
                    .on_audio(AudioChunk {
                        data: audio,
                        sample_rate: SAMPLE_RATE,
                        format: "wav".to_string(),
                    })
                    .await;
                callback.on_complete().await;
            }
            Err(e) => {
                warn!("{ENGINE_ID}: synthesis failed: {e}");
                callback.on_error(e).await;
            }
        }
    }

    fn stop(&self) {
        info!("{ENGINE_ID}: stopping synthesis");
        self.cancelled.store(true, Ordering::Release);
    }

    fn release(&self) {
        info!("{ENGINE_ID}: releasing engine");
        self.cancelled.store(true, Ordering::Release);
        self.released.store(true, Ordering::Release);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        errors: Mutex<Vec<EngineError>>,
    }

    impl SynthesisCallback for RecordingCallback {
        fn on_audio(
            &self,
            _chunk: AudioChunk,
        ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
            Box::pin(async {})
        }

        fn on_error(
            &self,
            error: EngineError,
        ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                self.errors.lock().unwrap().push(error);
            })
        }

        fn on_complete(&self) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
            Box::pin(async {})
        }
    }

    fn engine() -> Qwen3TtsEngine {
        Qwen3TtsEngine::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn missing_api_key_reports_not_configured() {
        let engine = engine();
        let callback = Arc::new(RecordingCallback::default());
        engine
            .synthesize(
                "hello",
                &SynthesisParams::default(),
                &EngineConfig::default(),
                callback.clone(),
            )
            .await;
        let errors = callback.errors.lock().unwrap();
        assert!(matches!(errors[0], EngineError::NotConfigured(_)));
    }

    #[test]
    fn is_configured_only_needs_api_key() {
        let engine = engine();
        let config = EngineConfig {
            api_key: "sk-abc".to_string(),
            ..EngineConfig::default()
        };
        assert!(engine.is_configured(&config));
        assert!(!engine.is_configured(&EngineConfig::default()));
    }

    #[test]
    fn request_body_uses_default_voice_when_unset() {
        let engine = engine();
        let body = engine.build_request_body("hi", &EngineConfig::default());
        assert_eq!(body["input"]["voice"], DEFAULT_VOICE);
        assert_eq!(body["model"], MODEL);
    }

    #[test]
    fn request_body_strips_language_suffix() {
        let engine = engine();
        let config = EngineConfig {
            api_key: "sk".to_string(),
            voice_id: "Serena::en-US".to_string(),
            ..EngineConfig::default()
        };
        let body = engine.build_request_body("hi", &config);
        assert_eq!(body["input"]["voice"], "Serena");
    }

    #[test]
    fn config_labels_omit_volcano_fields() {
        let engine = engine();
        assert_eq!(engine.config_label("api_key"), Some("API Key"));
        assert_eq!(engine.config_label("app_id"), None);
    }
}
