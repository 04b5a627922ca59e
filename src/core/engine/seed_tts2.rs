//! # Seed TTS 2.0 engine (Volcano Engine)
//!
//! One-shot HTTP synthesis against the Volcano Engine openspeech endpoint.
//! Authentication uses the platform's app id + access key pair; the response
//! carries base64-encoded audio in a JSON envelope with a numeric status
//! code (3000 means success).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::base::{
    map_transport_error, real_voice_name, AudioChunk, AudioConfig, EngineDescriptor, EngineError,
    EngineResult, SynthesisCallback, SynthesisParams, TtsEngine, VOICE_NAME_SEPARATOR,
};
use crate::core::store::EngineConfig;

pub const ENGINE_ID: &str = "seed-tts-2.0";
pub const ENGINE_NAME: &str = "Seed TTS 2.0";
pub const PROVIDER_NAME: &str = "Volcano Engine";

const SYNTHESIS_URL: &str = "https://openspeech.bytedance.com/api/v1/tts";
const CLUSTER: &str = "volcano_tts";
const SUCCESS_CODE: i64 = 3000;
const SAMPLE_RATE: u32 = 24000;

const SUPPORTED_LANGUAGES: &[&str] = &["zh", "zh-CN", "en", "en-US"];
const DEFAULT_VOICE: &str = "zh_female_tianmeitaozi_mars_bigtts";

const VOICE_IDS: &[&str] = &[
    "zh_female_tianmeitaozi_mars_bigtts",
    "zh_female_cancan_mars_bigtts",
    "zh_female_qingxinnvsheng_mars_bigtts",
    "zh_female_shuangkuaisisi_moon_bigtts",
    "zh_male_wennuanahu_moon_bigtts",
];

pub fn descriptor() -> EngineDescriptor {
    EngineDescriptor {
        id: ENGINE_ID.to_string(),
        name: ENGINE_NAME.to_string(),
        provider: PROVIDER_NAME.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct SeedTtsResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    /// Base64-encoded audio payload, present on success
    data: Option<String>,
}

/// Volcano Engine Seed TTS 2.0 implementation.
pub struct SeedTts2Engine {
    client: reqwest::Client,
    cancelled: AtomicBool,
    released: AtomicBool,
}

impl SeedTts2Engine {
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

    fn build_request_body(
        &self,
        text: &str,
        params: &SynthesisParams,
        config: &EngineConfig,
    ) -> serde_json::Value {
        let voice_type = if config.voice_id.is_empty() {
            DEFAULT_VOICE
        } else {
            real_voice_name(&config.voice_id)
        };
        json!({
            "app": {
                "appid": config.app_id,
                "token": config.access_key,
                "cluster": CLUSTER,
            },
            "user": {
                "uid": "parlance",
            },
            "audio": {
                "voice_type": voice_type,
                "encoding": "pcm",
                "rate": SAMPLE_RATE,
                "speed_ratio": params.speech_rate,
                "pitch_ratio": params.pitch,
            },
            "request": {
                "reqid": Uuid::new_v4().to_string(),
                "text": text,
                "operation": "query",
            },
        })
    }

    async fn run_synthesis(
        &self,
        text: &str,
        params: &SynthesisParams,
        config: &EngineConfig,
    ) -> EngineResult<Vec<u8>> {
        let body = self.build_request_body(text, params, config);
        let response = self
            .client
            .post(SYNTHESIS_URL)
            // The openspeech endpoint expects this non-standard scheme
            .header(AUTHORIZATION, format!("Bearer;{}", config.access_key))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::Provider {
                code: i64::from(status.as_u16()),
                message,
            });
        }

        let payload: SeedTtsResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Internal(format!("Malformed provider response: {e}")))?;

        if payload.code != SUCCESS_CODE {
            return Err(EngineError::Provider {
                code: payload.code,
                message: payload.message,
            });
        }

        let encoded = payload
            .data
            .ok_or_else(|| EngineError::Internal("Response carried no audio data".to_string()))?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| EngineError::Internal(format!("Invalid base64 audio payload: {e}")))
    }
}

#[async_trait]
impl TtsEngine for SeedTts2Engine {
    fn descriptor(&self) -> EngineDescriptor {
        descriptor()
    }

    fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: SAMPLE_RATE,
            channels: 1,
            format: "pcm",
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
        let configured = !config.app_id.trim().is_empty() && !config.access_key.trim().is_empty();
        debug!("{ENGINE_ID}: is_configured = {configured}");
        configured
    }

    fn config_label(&self, key: &str) -> Option<&'static str> {
        match key {
            "app_id" => Some("App ID"),
            "access_key" => Some("Access Key"),
            "voice_id" => Some("Voice"),
            _ => None,
        }
    }

    async fn synthesize(
        &self,
        text: &str,
        params: &SynthesisParams,
        config: &EngineConfig,
        callback: Arc<dyn SynthesisCallback>,
    ) {
        if self.released.load(Ordering::Acquire) {
            warn!("{ENGINE_ID}: synthesize called after release");
            callback.on_error(EngineError::Released).await;
            return;
        }
        if config.app_id.is_empty() || config.access_key.is_empty() {
            callback
                .on_error(EngineError::NotConfigured(
                    "App ID or Access Key is missing".to_string(),
                ))
                .await;
            return;
        }
        if text.is_empty() {
            callback.on_error(EngineError::EmptyText).await;
            return;
        }

        info!(
            "{ENGINE_ID}: starting synthesis, text length {}, pitch {}, rate {}",
            text.len(),
            params.pitch,
            params.speech_rate
        );
        debug!("{ENGINE_ID}: audio config {}", self.audio_config().description());
        self.cancelled.store(false, Ordering::Release);

        match self.run_synthesis(text, params, config).await {
            Ok(audio) => {
                if self.cancelled.load(Ordering::Acquire) {
                    // Cancelled mid-flight: drop the audio, complete silently
                    info!("{ENGINE_ID}: synthesis cancelled, discarding audio");
                    callback.on_complete().await;
                    return;
                }
                callback
                    .on_audio(AudioChunk {
                        data: audio,
                        sample_rate: SAMPLE_RATE,
                        format: "pcm".to_string(),
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
        completed: Mutex<bool>,
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
            Box::pin(async {
                *self.completed.lock().unwrap() = true;
            })
        }
    }

    fn engine() -> SeedTts2Engine {
        SeedTts2Engine::new(Duration::from_secs(5)).unwrap()
    }

    fn configured() -> EngineConfig {
        EngineConfig {
            app_id: "app".to_string(),
            access_key: "key".to_string(),
            voice_id: "zh_female_cancan_mars_bigtts::zh-CN".to_string(),
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn unconfigured_engine_reports_not_configured() {
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

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_network_call() {
        let engine = engine();
        let callback = Arc::new(RecordingCallback::default());
        engine
            .synthesize(
                "",
                &SynthesisParams::default(),
                &configured(),
                callback.clone(),
            )
            .await;
        let errors = callback.errors.lock().unwrap();
        assert!(matches!(errors[0], EngineError::EmptyText));
    }

    #[tokio::test]
    async fn released_engine_reports_released() {
        let engine = engine();
        engine.release();
        assert!(engine.is_released());
        let callback = Arc::new(RecordingCallback::default());
        engine
            .synthesize(
                "hello",
                &SynthesisParams::default(),
                &configured(),
                callback.clone(),
            )
            .await;
        let errors = callback.errors.lock().unwrap();
        assert!(matches!(errors[0], EngineError::Released));
    }

    #[test]
    fn is_configured_requires_both_credentials() {
        let engine = engine();
        assert!(engine.is_configured(&configured()));
        let mut partial = configured();
        partial.access_key.clear();
        assert!(!engine.is_configured(&partial));
        assert!(!engine.is_configured(&EngineConfig::default()));
    }

    #[test]
    fn default_voice_id_prefers_current_selection() {
        let engine = engine();
        assert_eq!(
            engine.default_voice_id("zh-CN", Some("zh_female_cancan_mars_bigtts")),
            "zh_female_cancan_mars_bigtts::zh-CN"
        );
        assert_eq!(
            engine.default_voice_id("zh-CN", None),
            "zh_female_tianmeitaozi_mars_bigtts::zh-CN"
        );
        assert_eq!(
            engine.default_voice_id("en-US", Some("   ")),
            "zh_female_tianmeitaozi_mars_bigtts::en-US"
        );
    }

    #[test]
    fn voice_catalog_crosses_voices_with_languages() {
        let engine = engine();
        let voices = engine.supported_voice_ids();
        assert_eq!(voices.len(), VOICE_IDS.len() * SUPPORTED_LANGUAGES.len());
        assert!(voices.contains(&"zh_female_cancan_mars_bigtts::zh-CN".to_string()));
    }

    #[test]
    fn request_body_strips_language_from_voice_id() {
        let engine = engine();
        let body = engine.build_request_body("hi", &SynthesisParams::default(), &configured());
        assert_eq!(
            body["audio"]["voice_type"],
            "zh_female_cancan_mars_bigtts"
        );
        assert_eq!(body["request"]["operation"], "query");
        assert_eq!(body["app"]["cluster"], CLUSTER);
    }

    #[test]
    fn voice_id_validity_requires_a_real_name() {
        let engine = engine();
        assert!(engine.is_voice_id_valid("zh_female_cancan_mars_bigtts::zh-CN"));
        assert!(engine.is_voice_id_valid("plain_voice"));
        assert!(!engine.is_voice_id_valid("::zh-CN"));
        assert!(!engine.is_voice_id_valid("   "));
    }

    #[test]
    fn stop_does_not_release_the_engine() {
        let engine = engine();
        engine.stop();
        assert!(!engine.is_released());
    }

    #[test]
    fn default_config_is_empty() {
        let engine = engine();
        assert_eq!(engine.default_config(), EngineConfig::default());
    }

    #[test]
    fn config_labels_cover_engine_fields() {
        let engine = engine();
        assert_eq!(engine.config_label("app_id"), Some("App ID"));
        assert_eq!(engine.config_label("access_key"), Some("Access Key"));
        assert_eq!(engine.config_label("voice_id"), Some("Voice"));
        assert_eq!(engine.config_label("api_key"), None);
    }
}
