use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::core::update::{UpdateChecker, UpdateStatus};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Handler for `GET /update`: poll the configured release repository and
/// compare against the running version.
pub async fn check_updates(State(state): State<Arc<AppState>>) -> AppResult<Json<UpdateStatus>> {
    let owner = state.config.update_owner.trim();
    let repo = state.config.update_repo.trim();
    if owner.is_empty() || repo.is_empty() {
        return Err(AppError::BadRequest(
            "Update checking is not configured".to_string(),
        ));
    }

    let checker = UpdateChecker::new(owner, repo)
        .map_err(|e| AppError::InternalServerError(format!("Failed to build HTTP client: {e}")))?;
    Ok(Json(checker.check(&state.config.app_version).await))
}
