use axum::{
    extract::Path,
    response::Json,
};

use crate::core::engine;
use crate::core::voices::VoiceInfo;
use crate::errors::app_error::{AppError, AppResult};

/// Handler for `GET /engines/{engine_id}/voices`.
pub async fn list_voices(Path(engine_id): Path<String>) -> AppResult<Json<Vec<VoiceInfo>>> {
    let descriptor = engine::descriptor(&engine_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown engine '{engine_id}'")))?;

    let repo = engine::create_voice_repository(&engine_id).ok_or_else(|| {
        AppError::InternalServerError(format!("Voice repository unavailable for '{engine_id}'"))
    })?;

    Ok(Json(repo.voices_for_engine(&descriptor).await))
}
