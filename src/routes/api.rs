use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, config, engines, speak, update, voices};
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/engines", get(engines::list_engines))
        .route("/engines/{engine_id}/status", get(engines::engine_status))
        .route("/engines/{engine_id}/voices", get(voices::list_voices))
        .route(
            "/engines/{engine_id}/config",
            get(config::get_config).put(config::save_config),
        )
        .route("/speak", post(speak::speak_handler))
        .route("/update", get(update::check_updates))
        .layer(TraceLayer::new_for_http())
}
