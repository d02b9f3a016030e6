//! Per-kind generation parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vgen_models::Resolution;

/// Text-to-speech input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    pub text: String,
    /// BCP-47 code such as `zh-HK`
    pub language_code: String,
    pub voice_id: String,
}

/// Talking-avatar input. The avatar lip-syncs to the speech artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarParams {
    pub avatar_id: String,
    pub audio_path: PathBuf,
    /// Location vendors fetch the narration from
    pub audio_url: String,
    /// Chroma backdrop as `#RRGGBB`
    pub background_color: String,
    pub resolution: Resolution,
    pub duration_secs: f64,
}

/// Background scene input for one narration segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneParams {
    pub prompt: String,
    pub style: String,
    pub duration_secs: f64,
    pub resolution: Resolution,
    /// Segment position in the narration
    pub order: usize,
}

/// Whole seconds sent to vendors, never below one.
pub fn vendor_seconds(seconds: f64) -> u32 {
    if seconds.is_finite() {
        (seconds.ceil() as u32).max(1)
    } else {
        1
    }
}
