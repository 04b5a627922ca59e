use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::engine;
use crate::core::store::EngineConfig;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Stored engine configuration as returned over HTTP.
///
/// Credential fields are masked: the HTTP surface only needs to show
/// whether a secret is set, never its value.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub engine_id: String,
    pub api_key: String,
    pub app_id: String,
    pub access_key: String,
    pub voice_id: String,
}

/// Request body for saving engine configuration. Omitted fields are
/// written back as empty strings.
#[derive(Debug, Deserialize)]
pub struct SaveConfigRequest {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub voice_id: String,
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Handler for `GET /engines/{engine_id}/config`.
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path(engine_id): Path<String>,
) -> AppResult<Json<ConfigResponse>> {
    let descriptor = engine::descriptor(&engine_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown engine '{engine_id}'")))?;

    let repo = engine::create_config_repository(&engine_id, &state.store).ok_or_else(|| {
        AppError::InternalServerError(format!("Config repository unavailable for '{engine_id}'"))
    })?;

    let config = repo.config(&descriptor);
    Ok(Json(ConfigResponse {
        engine_id: descriptor.id,
        api_key: mask(&config.api_key),
        app_id: config.app_id,
        access_key: mask(&config.access_key),
        voice_id: config.voice_id,
    }))
}

/// Handler for `PUT /engines/{engine_id}/config`.
pub async fn save_config(
    State(state): State<Arc<AppState>>,
    Path(engine_id): Path<String>,
    Json(request): Json<SaveConfigRequest>,
) -> AppResult<Json<Value>> {
    let descriptor = engine::descriptor(&engine_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown engine '{engine_id}'")))?;

    let repo = engine::create_config_repository(&engine_id, &state.store).ok_or_else(|| {
        AppError::InternalServerError(format!("Config repository unavailable for '{engine_id}'"))
    })?;

    let config = EngineConfig {
        api_key: request.api_key,
        app_id: request.app_id,
        access_key: request.access_key,
        voice_id: request.voice_id,
    };
    repo.save_config(&descriptor, &config)
        .map_err(|e| AppError::InternalServerError(format!("Failed to persist config: {e}")))?;

    tracing::info!("saved configuration for engine {}", descriptor.id);
    Ok(Json(json!({ "status": "saved", "engine_id": descriptor.id })))
}
