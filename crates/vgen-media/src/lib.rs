#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for composing narrated videos.
//!
//! This crate provides:
//! - Multi-input FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeouts via tokio
//! - Scene-switching and picture-in-picture composition
//! - Placeholder audio/video for offline generation

pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod placeholder;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{CompositionPlan, Compositor, FfmpegCompositor, PipLayout, SceneClip};
pub use error::{MediaError, MediaResult};
pub use placeholder::{write_stub, PlaceholderRenderer, StubKind, MP3_STUB, MP4_STUB};
pub use probe::{get_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
