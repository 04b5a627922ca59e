use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::engine;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Handler for `GET /engines`: every registered engine descriptor.
pub async fn list_engines() -> Json<Vec<engine::EngineDescriptor>> {
    Json(engine::registered_engines())
}

/// Handler for `GET /engines/{engine_id}/status`.
///
/// Reports whether the engine is registered and whether any configuration
/// has been saved for it.
pub async fn engine_status(
    State(state): State<Arc<AppState>>,
    Path(engine_id): Path<String>,
) -> AppResult<Json<Value>> {
    let descriptor = engine::descriptor(&engine_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown engine '{engine_id}'")))?;

    let repo = engine::create_config_repository(&engine_id, &state.store).ok_or_else(|| {
        AppError::InternalServerError(format!("Config repository unavailable for '{engine_id}'"))
    })?;

    Ok(Json(json!({
        "id": descriptor.id,
        "name": descriptor.name,
        "provider": descriptor.provider,
        "registered": true,
        "configured": repo.has_config(&descriptor),
    })))
}
