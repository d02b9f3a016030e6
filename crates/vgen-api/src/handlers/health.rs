//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use vgen_providers::ProviderStatus;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Liveness: the process is up.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Outcome of one readiness dependency.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Check {
    Ok,
    Error { error: String },
}

impl Check {
    fn from_result<T, E: ToString>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Check::Ok,
            Err(e) => Check::Error {
                error: e.to_string(),
            },
        }
    }

    fn passed(&self) -> bool {
        matches!(self, Check::Ok)
    }
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub ffmpeg: Check,
    pub ffprobe: Check,
    pub content_dir: Check,
    /// Which adapters will call a vendor and which run offline
    pub providers: Vec<ProviderStatus>,
    pub available_slots: usize,
}

/// Readiness: FFmpeg is installed and the content directory is usable.
/// Provider modes are informational; offline adapters are always ready.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let content_dir = match tokio::fs::metadata(state.store().root()).await {
        Ok(meta) if !meta.is_dir() => Check::Error {
            error: "content path is not a directory".into(),
        },
        Ok(meta) if meta.permissions().readonly() => Check::Error {
            error: "content directory is read-only".into(),
        },
        other => Check::from_result(other),
    };

    let response = ReadinessResponse {
        status: "ready",
        ffmpeg: Check::from_result(vgen_media::check_ffmpeg()),
        ffprobe: Check::from_result(vgen_media::check_ffprobe()),
        content_dir,
        providers: state.providers().status(),
        available_slots: state.executor.available_slots(),
    };

    // Without ffprobe narration length falls back to a text estimate.
    if response.ffmpeg.passed() && response.content_dir.passed() {
        (StatusCode::OK, Json(response))
    } else {
        let response = ReadinessResponse {
            status: "degraded",
            ..response
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
