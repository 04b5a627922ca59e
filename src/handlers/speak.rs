use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::core::engine::{self, AudioChunk, EngineError, SynthesisCallback, SynthesisParams};
use crate::errors::app_error::AppError;
use crate::state::AppState;

const HEADER_AUDIO_FORMAT: HeaderName = HeaderName::from_static("x-audio-format");
const HEADER_SAMPLE_RATE: HeaderName = HeaderName::from_static("x-sample-rate");

/// Request body for the speak endpoint
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    /// Which registered engine performs the synthesis
    pub engine_id: String,
    /// The text to synthesize
    pub text: String,
    /// Optional pitch/rate overrides
    #[serde(default)]
    pub params: SynthesisParams,
}

/// Collector accumulating synthesis output delivered through the callback
struct AudioCollector {
    audio_data: Mutex<Vec<u8>>,
    format: Mutex<Option<String>>,
    sample_rate: Mutex<Option<u32>>,
    error: Mutex<Option<EngineError>>,
}

impl AudioCollector {
    fn new() -> Self {
        Self {
            audio_data: Mutex::new(Vec::new()),
            format: Mutex::new(None),
            sample_rate: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    async fn result(&self) -> Result<(Vec<u8>, String, u32), EngineError> {
        if let Some(err) = self.error.lock().await.clone() {
            return Err(err);
        }
        let audio = std::mem::take(&mut *self.audio_data.lock().await);
        let format = self
            .format
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| "pcm".to_string());
        let sample_rate = self.sample_rate.lock().await.unwrap_or(24000);
        Ok((audio, format, sample_rate))
    }
}

impl SynthesisCallback for AudioCollector {
    fn on_audio(
        &self,
        chunk: AudioChunk,
    ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            // Format and sample rate come from the first chunk
            if self.format.lock().await.is_none() {
                *self.format.lock().await = Some(chunk.format.clone());
                *self.sample_rate.lock().await = Some(chunk.sample_rate);
            }
            self.audio_data.lock().await.extend_from_slice(&chunk.data);
        })
    }

    fn on_error(
        &self,
        error: EngineError,
    ) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            *self.error.lock().await = Some(error);
        })
    }

    fn on_complete(&self) -> Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

fn map_engine_error(engine_id: &str, error: EngineError) -> AppError {
    match error {
        EngineError::NotConfigured(msg) => {
            AppError::BadRequest(format!("Engine '{engine_id}' is not configured: {msg}"))
        }
        EngineError::EmptyText | EngineError::InvalidConfiguration(_) => {
            AppError::BadRequest(error.to_string())
        }
        EngineError::Network(_) | EngineError::Timeout(_) | EngineError::Provider { .. } => {
            AppError::UpstreamFailure(error.to_string())
        }
        EngineError::Released | EngineError::Internal(_) => {
            AppError::InternalServerError(error.to_string())
        }
    }
}

/// Handler for the `POST /speak` endpoint.
///
/// Synthesizes the request text with the selected engine and returns the
/// raw audio bytes, with the encoding described by response headers.
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeakRequest>,
) -> Response {
    info!(
        "Speak request received - engine: {}, text length: {}",
        request.engine_id,
        request.text.len()
    );

    if request.text.trim().is_empty() {
        return AppError::BadRequest("Text must not be empty".to_string()).into_response();
    }

    let Some(tts) = engine::create_engine(&request.engine_id, state.request_timeout()) else {
        return AppError::NotFound(format!("Unknown engine '{}'", request.engine_id))
            .into_response();
    };
    let descriptor = tts.descriptor();

    let Some(repo) = engine::create_config_repository(&request.engine_id, &state.store) else {
        return AppError::InternalServerError(format!(
            "Config repository unavailable for '{}'",
            request.engine_id
        ))
        .into_response();
    };
    let config = repo.config(&descriptor);
    if !tts.is_configured(&config) {
        return AppError::BadRequest(format!(
            "Engine '{}' is not configured",
            request.engine_id
        ))
        .into_response();
    }

    let collector = Arc::new(AudioCollector::new());
    tts.synthesize(&request.text, &request.params, &config, collector.clone())
        .await;

    match collector.result().await {
        Ok((audio, format, sample_rate)) => {
            info!(
                "Synthesis complete - engine: {}, {} bytes of {format} audio",
                descriptor.id,
                audio.len()
            );
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        "application/octet-stream".to_string(),
                    ),
                    (HEADER_AUDIO_FORMAT, format),
                    (HEADER_SAMPLE_RATE, sample_rate.to_string()),
                ],
                audio,
            )
                .into_response()
        }
        Err(error) => map_engine_error(&descriptor.id, error).into_response(),
    }
}
