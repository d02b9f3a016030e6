//! Shared data models for the VGen pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Text units, content annotations and timed segments
//! - Generation jobs and their lifecycle
//! - Assembly requests, stages and results
//! - Voice/avatar catalogs and output encoding

pub mod assembly;
pub mod catalog;
pub mod encoding;
pub mod job;
pub mod request;
pub mod text;

// Re-export common types
pub use assembly::{AssemblyResult, AssemblyStage};
pub use catalog::{AvatarInfo, Gender, LanguageInfo, VoiceInfo};
pub use encoding::EncodingConfig;
pub use job::{GenerationJob, JobId, JobKind, JobStatus, JobTransitionError, ProviderKind};
pub use request::{
    is_valid_artifact_id, AssemblyRequest, AudioReference, CompositionMode, PipPosition,
    RequestError, Resolution,
};
pub use text::{ContentAnnotation, Script, TextUnit, TimedSegment};
