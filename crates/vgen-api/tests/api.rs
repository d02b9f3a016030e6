//! Router-level tests with offline providers and a fake compositor.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::watch;
use tower::ServiceExt;

use vgen_api::{create_router, ApiConfig, AppState};
use vgen_media::{CompositionPlan, Compositor, MediaError, MediaResult};
use vgen_providers::{FallbackPolicy, Providers};
use vgen_worker::{AssemblyExecutor, AssemblyOrchestrator, WorkerConfig};

struct MarkerCompositor;

#[async_trait]
impl Compositor for MarkerCompositor {
    async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
        Err(MediaError::FfprobeNotFound)
    }

    async fn compose(
        &self,
        plan: &CompositionPlan,
        output: &Path,
        _cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()> {
        plan.validate()?;
        tokio::fs::write(output, b"composed").await?;
        Ok(())
    }
}

fn app(dir: &TempDir) -> Router {
    let config = WorkerConfig::with_content_dir(dir.path());
    let orchestrator = AssemblyOrchestrator::new(
        Arc::new(Providers::offline(FallbackPolicy::BestEffort)),
        Arc::new(MarkerCompositor),
        config.clone(),
    );
    let state = AppState::with_executor(
        ApiConfig::default(),
        AssemblyExecutor::new(orchestrator, &config),
    );
    create_router(state, None)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn health_sets_security_headers() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, headers, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "healthy");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["cross-origin-resource-policy"], "same-origin");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn generate_then_stream_video() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let request = json!({
        "text": "Hello world. This is a test.\nSecond line about oceans.",
        "voice_id": "en-US-JennyNeural",
        "avatar_id": "en-f-01",
        "video_mode": "picture_in_picture",
    });
    let (status, body) = post_json(&app, "/api/generate", request.to_string()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["mode"], "picture_in_picture");
    assert_eq!(body["scene_job_ids"].as_array().unwrap().len(), 2);
    assert_eq!(body["degraded"], false);
    assert_eq!(body["stages"].as_array().unwrap().last().unwrap(), "done");

    let video_url = body["video_url"].as_str().unwrap().to_string();
    let (status, headers, bytes) = get(&app, &video_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
    assert_eq!(bytes, b"composed");

    let download_url = body["download_url"].as_str().unwrap().to_string();
    let (status, headers, _) = get(&app, &download_url).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let speech_id = body["speech_id"].as_str().unwrap();
    let (status, headers, _) = get(&app, &format!("/api/audio/{speech_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
}

#[tokio::test]
async fn generate_rejects_missing_avatar() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let request = json!({ "text": "Hello.", "voice_id": "en-US-Neural2-F" });
    let (status, body) = post_json(&app, "/api/generate", request.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "client_error");
    assert!(body["detail"].as_str().unwrap().contains("avatar"));
}

#[tokio::test]
async fn generate_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = post_json(&app, "/api/generate", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn generate_with_unknown_audio_reference() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let request = json!({
        "audio_reference": { "id": "narration", "ext": "mp3" },
        "voice_id": "en-US-Neural2-F",
        "avatar_id": "en-f-01",
    });
    let (status, body) = post_json(&app, "/api/generate", request.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "client_error");
}

#[tokio::test]
async fn catalogs() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, _, body) = get(&app, "/api/languages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["languages"].as_array().unwrap().len(), 3);

    // Offline speech lists Google's catalog.
    let (status, _, body) = get(&app, "/api/voices?language=zh-HK&gender=female").await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["provider"], "google");
    assert_eq!(body["voices"][0]["id"], "yue-HK-Standard-A");
    assert_eq!(body["voices"].as_array().unwrap().len(), 1);

    let (_, _, body) = get(&app, "/api/voices?language=en-US&provider=azure").await;
    assert_eq!(json_body(&body)["voices"].as_array().unwrap().len(), 2);

    let (status, _, body) = get(&app, "/api/avatars?language=zh-HK&gender=male").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["avatars"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn catalog_rejects_bad_queries() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    for uri in [
        "/api/voices",
        "/api/voices?language=fr-FR",
        "/api/voices?language=en-US&provider=deepbrain",
        "/api/avatars?language=en-US&gender=other",
    ] {
        let (status, _, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn media_routes_validate_ids() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    tokio::fs::write(dir.path().join("narr.wav"), b"RIFF").await.unwrap();

    let (status, _, _) = get(&app, "/api/video/bad.id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = get(&app, "/api/video/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json_body(&body)["detail"].is_string());

    let (status, headers, bytes) = get(&app, "/api/audio/narr").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(bytes, b"RIFF");
}
