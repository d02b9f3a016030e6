//! Assembly endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use vgen_models::{AssemblyRequest, AssemblyStage, CompositionMode};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub request_id: String,
    pub mode: CompositionMode,
    pub speech_id: String,
    pub avatar_video_id: String,
    pub scene_job_ids: Vec<String>,
    pub final_video_id: String,
    pub video_url: String,
    pub download_url: String,
    pub narration_seconds: f64,
    /// Jobs served by the offline generator
    pub fallbacks: usize,
    pub degraded: bool,
    pub stages: Vec<AssemblyStage>,
}

/// Assemble a video and wait for it.
///
/// The request is cancelled if the client disconnects before assembly finishes.
pub async fn generate_video(
    State(state): State<AppState>,
    body: Result<Json<AssemblyRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let Json(request) = body?;
    // Fail fast before taking an executor slot.
    request.validate_request()?;

    info!(mode = request.mode.as_str(), "Assembly requested");
    let result = state.executor.execute(request).await?;

    Ok(Json(GenerateResponse {
        success: true,
        request_id: result.request_id.to_string(),
        mode: result.mode,
        speech_id: result.speech_job.id.to_string(),
        avatar_video_id: result.avatar_job.id.to_string(),
        scene_job_ids: result.scene_job_ids(),
        video_url: format!("/api/video/{}", result.final_video_id),
        download_url: format!("/api/download/{}", result.final_video_id),
        narration_seconds: result.narration_seconds,
        fallbacks: result.fallback_count(),
        degraded: result.degraded,
        stages: result.stages,
        final_video_id: result.final_video_id,
    }))
}
