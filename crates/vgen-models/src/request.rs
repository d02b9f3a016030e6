//! Assembly request definitions and entry validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Chroma-key background used for avatar renders.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#00FF00";
/// Avatar width as a fraction of the frame width in picture-in-picture mode.
pub const DEFAULT_PIP_SIZE_RATIO: f64 = 0.3;
/// Default visual style requested from scene vendors.
pub const DEFAULT_SCENE_STYLE: &str = "realistic";

/// Audio formats accepted as pre-recorded narration.
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// How the final video is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Scenes full-frame in sequence; the avatar contributes audio only
    #[default]
    SceneSwitching,
    /// Scenes as background with the avatar overlaid in a corner
    PictureInPicture,
}

impl CompositionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionMode::SceneSwitching => "scene_switching",
            CompositionMode::PictureInPicture => "picture_in_picture",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output resolution preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
}

impl Resolution {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::P1080 => (1920, 1080),
            Resolution::P720 => (1280, 720),
            Resolution::P480 => (854, 480),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::P1080 => "1080p",
            Resolution::P720 => "720p",
            Resolution::P480 => "480p",
        }
    }

    /// Lenient parse: unknown presets map to 720p.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Resolution::P720)
    }
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1080p" => Ok(Resolution::P1080),
            "720p" => Ok(Resolution::P720),
            "480p" => Ok(Resolution::P480),
            _ => Err(ParseResolutionError(s.to_string())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resolution: {0}")]
pub struct ParseResolutionError(pub String);

/// Corner the avatar is pinned to in picture-in-picture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PipPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

/// Pre-recorded narration stored in the content directory as `{id}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AudioReference {
    pub id: String,
    #[serde(default = "default_audio_ext")]
    pub ext: String,
}

fn default_audio_ext() -> String {
    "mp3".to_string()
}

impl AudioReference {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.ext)
    }
}

/// Entry validation failure. Always a client error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("narration text or audio reference is required")]
    MissingNarration,

    #[error("voice selection is required")]
    MissingVoice,

    #[error("avatar selection is required")]
    MissingAvatar,

    #[error("unsupported audio format: {0}")]
    UnsupportedAudio(String),

    #[error("invalid artifact id: {0}")]
    InvalidArtifactId(String),

    #[error("pip size ratio must be within (0, 1], got {0}")]
    InvalidPipRatio(f64),

    #[error("background color must be a #RRGGBB hex value, got {0}")]
    InvalidBackgroundColor(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Caller-supplied description of the video to assemble.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct AssemblyRequest {
    /// Narration text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Pre-recorded narration; takes the place of speech synthesis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_reference: Option<AudioReference>,

    /// BCP-47 language code; detected from the text when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub voice_id: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub avatar_id: String,

    #[serde(default, alias = "video_mode")]
    pub mode: CompositionMode,

    #[serde(default, deserialize_with = "lenient_resolution")]
    pub resolution: Resolution,

    #[serde(default = "default_scene_style")]
    pub scene_style: String,

    #[serde(default = "default_background_color")]
    pub background_color: String,

    #[serde(default)]
    pub pip_position: PipPosition,

    #[serde(default = "default_pip_size_ratio")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub pip_size_ratio: f64,
}

fn lenient_resolution<'de, D>(deserializer: D) -> Result<Resolution, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Resolution::parse_lenient(&raw))
}

fn default_scene_style() -> String {
    DEFAULT_SCENE_STYLE.to_string()
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

fn default_pip_size_ratio() -> f64 {
    DEFAULT_PIP_SIZE_RATIO
}

impl AssemblyRequest {
    /// Request narrated by text.
    pub fn from_text(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        avatar_id: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            audio_reference: None,
            language: None,
            voice_id: voice_id.into(),
            avatar_id: avatar_id.into(),
            mode: CompositionMode::default(),
            resolution: Resolution::default(),
            scene_style: default_scene_style(),
            background_color: default_background_color(),
            pip_position: PipPosition::default(),
            pip_size_ratio: DEFAULT_PIP_SIZE_RATIO,
        }
    }

    /// Request narrated by a pre-recorded audio artifact.
    pub fn from_audio(
        audio: AudioReference,
        voice_id: impl Into<String>,
        avatar_id: impl Into<String>,
    ) -> Self {
        Self {
            text: None,
            audio_reference: Some(audio),
            ..Self::from_text("", voice_id, avatar_id)
        }
    }

    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Narration text, if any non-blank text was supplied.
    pub fn narration_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Check the caller-controlled fields. Narration comes first, then voice, then avatar.
    pub fn validate_request(&self) -> Result<(), RequestError> {
        if self.narration_text().is_none() && self.audio_reference.is_none() {
            return Err(RequestError::MissingNarration);
        }
        if let Some(audio) = &self.audio_reference {
            if self.narration_text().is_none() {
                if !is_valid_artifact_id(&audio.id) {
                    return Err(RequestError::InvalidArtifactId(audio.id.clone()));
                }
                if !SUPPORTED_AUDIO_EXTENSIONS.contains(&audio.ext.as_str()) {
                    return Err(RequestError::UnsupportedAudio(audio.ext.clone()));
                }
            }
        }
        if self.voice_id.trim().is_empty() {
            return Err(RequestError::MissingVoice);
        }
        if self.avatar_id.trim().is_empty() {
            return Err(RequestError::MissingAvatar);
        }
        if !is_hex_color(&self.background_color) {
            return Err(RequestError::InvalidBackgroundColor(
                self.background_color.clone(),
            ));
        }

        self.validate().map_err(|errors| {
            let fields = errors.field_errors();
            if fields.contains_key("pip_size_ratio") {
                RequestError::InvalidPipRatio(self.pip_size_ratio)
            } else {
                RequestError::Invalid(errors.to_string())
            }
        })
    }
}

/// Artifact ids are restricted to `[A-Za-z0-9_-]+` so they never escape the content directory.
pub fn is_valid_artifact_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `#RRGGBB` or bare `RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    let hex = value.trim().trim_start_matches('#');
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!(Resolution::P1080.dimensions(), (1920, 1080));
        assert_eq!(Resolution::P720.dimensions(), (1280, 720));
        assert_eq!(Resolution::P480.dimensions(), (854, 480));
        assert_eq!(Resolution::parse_lenient("4k"), Resolution::P720);
        assert_eq!("1080P".parse::<Resolution>().unwrap(), Resolution::P1080);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: AssemblyRequest = serde_json::from_str(
            r#"{"text": "hello", "voice_id": "en-US-JennyNeural", "avatar_id": "en-f-01"}"#,
        )
        .unwrap();
        assert_eq!(req.mode, CompositionMode::SceneSwitching);
        assert_eq!(req.resolution, Resolution::P1080);
        assert_eq!(req.background_color, "#00FF00");
        assert_eq!(req.pip_position, PipPosition::BottomRight);
        assert!((req.pip_size_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(req.scene_style, "realistic");
        assert!(req.validate_request().is_ok());
    }

    #[test]
    fn test_unknown_resolution_falls_back_to_720p() {
        let req: AssemblyRequest = serde_json::from_str(
            r#"{"text": "hi", "voice_id": "v", "avatar_id": "a", "resolution": "4k"}"#,
        )
        .unwrap();
        assert_eq!(req.resolution, Resolution::P720);

        let req: AssemblyRequest = serde_json::from_str(
            r#"{"text": "hi", "voice_id": "v", "avatar_id": "a", "resolution": "480p"}"#,
        )
        .unwrap();
        assert_eq!(req.resolution, Resolution::P480);
    }

    #[test]
    fn test_background_color_rejected_at_entry() {
        let mut req = AssemblyRequest::from_text("hello", "v", "a")
            .with_mode(CompositionMode::PictureInPicture);
        req.background_color = "green".into();
        assert_eq!(
            req.validate_request(),
            Err(RequestError::InvalidBackgroundColor("green".into()))
        );

        req.background_color = "1a2b3c".into();
        assert!(req.validate_request().is_ok());
        assert!(!is_hex_color("#00FF0"));
    }

    #[test]
    fn test_video_mode_alias() {
        let req: AssemblyRequest = serde_json::from_str(
            r#"{"text": "hi", "voice_id": "v", "avatar_id": "a", "video_mode": "picture_in_picture"}"#,
        )
        .unwrap();
        assert_eq!(req.mode, CompositionMode::PictureInPicture);
    }

    #[test]
    fn test_validation_order() {
        let mut req = AssemblyRequest::from_text("  ", "", "");
        assert_eq!(req.validate_request(), Err(RequestError::MissingNarration));

        req.text = Some("hello".into());
        assert_eq!(req.validate_request(), Err(RequestError::MissingVoice));

        req.voice_id = "en-US-GuyNeural".into();
        assert_eq!(req.validate_request(), Err(RequestError::MissingAvatar));

        req.avatar_id = "en-m-01".into();
        assert!(req.validate_request().is_ok());
    }

    #[test]
    fn test_audio_reference_validation() {
        let audio = AudioReference {
            id: "abc-123".into(),
            ext: "ogg".into(),
        };
        let req = AssemblyRequest::from_audio(audio, "v", "a");
        assert_eq!(
            req.validate_request(),
            Err(RequestError::UnsupportedAudio("ogg".into()))
        );

        let audio = AudioReference {
            id: "../etc/passwd".into(),
            ext: "mp3".into(),
        };
        let req = AssemblyRequest::from_audio(audio, "v", "a");
        assert!(matches!(
            req.validate_request(),
            Err(RequestError::InvalidArtifactId(_))
        ));
    }

    #[test]
    fn test_pip_ratio_range() {
        let mut req = AssemblyRequest::from_text("hello", "v", "a");
        req.pip_size_ratio = 0.0;
        assert_eq!(req.validate_request(), Err(RequestError::InvalidPipRatio(0.0)));
        req.pip_size_ratio = 1.0;
        assert!(req.validate_request().is_ok());
    }

    #[test]
    fn test_artifact_id() {
        assert!(is_valid_artifact_id("3f2a-bc_01"));
        assert!(!is_valid_artifact_id(""));
        assert!(!is_valid_artifact_id("a/b"));
        assert!(!is_valid_artifact_id("a.mp4"));
    }
}
