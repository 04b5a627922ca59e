use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use parlance::{routes, state::AppState, ServerConfig};

fn test_config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 3001,
        store_path: dir.path().join("store.json"),
        request_timeout_secs: 5,
        update_owner: "acme".to_string(),
        update_repo: "widget".to_string(),
        app_version: "0.1.0".to_string(),
    }
}

fn test_app(dir: &tempfile::TempDir) -> axum::Router {
    let state = AppState::new(test_config(dir)).unwrap();
    routes::api::create_api_router().with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
}

#[tokio::test]
async fn test_engine_enumeration() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .uri("/engines")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let engines = json.as_array().unwrap();
    let ids: Vec<&str> = engines
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"seed-tts-2.0"));
    assert!(ids.contains(&"qwen3-tts"));
}

#[tokio::test]
async fn test_unknown_engine_voices_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .uri("/engines/no-such-engine/voices")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_voice_catalog_for_seed_engine() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .uri("/engines/seed-tts-2.0/voices")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let voices = json.as_array().unwrap();
    assert_eq!(voices.len(), 5);
    assert!(voices
        .iter()
        .any(|v| v["voice_id"] == "zh_female_cancan_mars_bigtts"));
}

#[tokio::test]
async fn test_config_round_trip_masks_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let save = Request::builder()
        .method("PUT")
        .uri("/engines/seed-tts-2.0/config")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "app_id": "my-app",
                "access_key": "super-secret",
                "voice_id": "zh_female_cancan_mars_bigtts::zh-CN"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(save).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let read = Request::builder()
        .uri("/engines/seed-tts-2.0/config")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(read).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["engine_id"], "seed-tts-2.0");
    assert_eq!(json["app_id"], "my-app");
    assert_eq!(json["voice_id"], "zh_female_cancan_mars_bigtts::zh-CN");
    // Credential is masked on read-back
    assert_eq!(json["access_key"], "********");
}

#[tokio::test]
async fn test_engine_status_reflects_saved_config() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let before = Request::builder()
        .uri("/engines/qwen3-tts/status")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(before).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["registered"], true);
    assert_eq!(json["configured"], false);

    let save = Request::builder()
        .method("PUT")
        .uri("/engines/qwen3-tts/config")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "api_key": "sk-123", "voice_id": "Cherry::zh-CN" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(save).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = Request::builder()
        .uri("/engines/qwen3-tts/status")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(after).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["configured"], true);
}

#[tokio::test]
async fn test_speak_with_unknown_engine_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/speak")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "engine_id": "no-such-engine", "text": "hello" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_speak_with_empty_text_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/speak")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "engine_id": "seed-tts-2.0", "text": "   " }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speak_with_unconfigured_engine_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/speak")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "engine_id": "seed-tts-2.0", "text": "hello" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_engine_config_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let request = Request::builder()
        .method("PUT")
        .uri("/engines/no-such-engine/config")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "api_key": "k" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
