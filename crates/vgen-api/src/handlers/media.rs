//! Serving artifacts from the content directory.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use vgen_models::is_valid_artifact_id;
use vgen_models::request::SUPPORTED_AUDIO_EXTENSIONS;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream a composed (or avatar) video inline.
pub async fn stream_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Response> {
    let path = locate(&state, &video_id, &["mp4"]).await?;
    serve_file(path, "video/mp4", None).await
}

/// Same file as [`stream_video`], offered as an attachment.
pub async fn download_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Response> {
    let path = locate(&state, &video_id, &["mp4"]).await?;
    let disposition = format!("attachment; filename=\"{video_id}.mp4\"");
    serve_file(path, "video/mp4", Some(disposition)).await
}

/// Narration audio; avatar vendors fetch it from here when a public base URL is set.
pub async fn stream_audio(
    State(state): State<AppState>,
    Path(audio_id): Path<String>,
) -> ApiResult<Response> {
    let path = locate(&state, &audio_id, SUPPORTED_AUDIO_EXTENSIONS).await?;
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("wav") => "audio/wav",
        _ => "audio/mpeg",
    };
    serve_file(path, content_type, None).await
}

async fn locate(state: &AppState, id: &str, extensions: &[&str]) -> ApiResult<PathBuf> {
    if !is_valid_artifact_id(id) {
        return Err(ApiError::bad_request("Invalid artifact id"));
    }
    for ext in extensions {
        if let Some(path) = state.store().existing(id, ext).await {
            return Ok(path);
        }
    }
    Err(ApiError::not_found(format!("{id} not found")))
}

async fn serve_file(
    path: PathBuf,
    content_type: &'static str,
    disposition: Option<String>,
) -> ApiResult<Response> {
    let file = File::open(&path)
        .await
        .map_err(|e| ApiError::internal(format!("failed to open artifact: {e}")))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("failed to stat artifact: {e}")))?
        .len();
    debug!("Serving {} ({} bytes)", path.display(), len);

    let body = Body::from_stream(stream::try_unfold(file, next_chunk));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header("Cross-Origin-Resource-Policy", "cross-origin");
    if let Some(disposition) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder
        .body(body)
        .map_err(|e| ApiError::internal(format!("failed to build response: {e}")))
}

async fn next_chunk(mut file: File) -> std::io::Result<Option<(Vec<u8>, File)>> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let n = file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((buf, file)))
}
