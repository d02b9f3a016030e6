//! Media error types.

use std::path::PathBuf;
use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffmpeg binary not found on PATH")]
    FfmpegNotFound,

    #[error("ffprobe binary not found on PATH")]
    FfprobeNotFound,

    /// ffmpeg ran and exited unsuccessfully
    #[error("ffmpeg failed: {message}")]
    FfmpegFailed {
        message: String,
        /// Tail of stderr, when captured
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("no such input: {0}")]
    FileNotFound(PathBuf),

    #[error("cancelled")]
    Cancelled,

    #[error("ffmpeg exceeded its {0}s time limit")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unreadable ffprobe output: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid media: {0}")]
    InvalidMedia(String),

    /// The composition plan is inconsistent (no scenes, missing avatar, bad ratio)
    #[error("invalid composition plan: {0}")]
    InvalidPlan(String),
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn invalid_media(message: impl Into<String>) -> Self {
        Self::InvalidMedia(message.into())
    }

    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidPlan(message.into())
    }
}
