//! Assembly pipeline stages and results.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CompositionMode, GenerationJob, JobId, JobStatus, TimedSegment};

/// Stage of an assembly request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStage {
    #[default]
    Validating,
    Synthesizing,
    Avataring,
    SceneGenerating,
    Composing,
    Done,
    Failed,
    Aborted,
}

impl AssemblyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyStage::Validating => "validating",
            AssemblyStage::Synthesizing => "synthesizing",
            AssemblyStage::Avataring => "avataring",
            AssemblyStage::SceneGenerating => "scene_generating",
            AssemblyStage::Composing => "composing",
            AssemblyStage::Done => "done",
            AssemblyStage::Failed => "failed",
            AssemblyStage::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssemblyStage::Done | AssemblyStage::Failed | AssemblyStage::Aborted
        )
    }

    /// Next stage on the happy path.
    pub fn next(&self) -> Option<AssemblyStage> {
        match self {
            AssemblyStage::Validating => Some(AssemblyStage::Synthesizing),
            AssemblyStage::Synthesizing => Some(AssemblyStage::Avataring),
            AssemblyStage::Avataring => Some(AssemblyStage::SceneGenerating),
            AssemblyStage::SceneGenerating => Some(AssemblyStage::Composing),
            AssemblyStage::Composing => Some(AssemblyStage::Done),
            _ => None,
        }
    }

    /// Progress percentage reported when the stage is entered.
    pub fn progress(&self) -> u8 {
        match self {
            AssemblyStage::Validating => 0,
            AssemblyStage::Synthesizing => 10,
            AssemblyStage::Avataring => 30,
            AssemblyStage::SceneGenerating => 50,
            AssemblyStage::Composing => 80,
            AssemblyStage::Done => 100,
            AssemblyStage::Failed | AssemblyStage::Aborted => 0,
        }
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything produced for one assembly request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssemblyResult {
    pub request_id: JobId,
    pub mode: CompositionMode,
    pub speech_job: GenerationJob,
    pub avatar_job: GenerationJob,
    /// Scene jobs in narration order
    pub scene_jobs: Vec<GenerationJob>,
    pub segments: Vec<TimedSegment>,
    pub narration_seconds: f64,
    /// Id of the composed video (`{id}.mp4` in the content directory)
    pub final_video_id: String,
    pub final_video_uri: String,
    /// Set when composition failed and the avatar clip stands in for the final video
    #[serde(default)]
    pub degraded: bool,
    /// Stages visited, in order
    pub stages: Vec<AssemblyStage>,
    pub completed_at: DateTime<Utc>,
}

impl AssemblyResult {
    /// All referenced jobs succeeded.
    pub fn is_complete(&self) -> bool {
        self.speech_job.status == JobStatus::Succeeded
            && self.avatar_job.status == JobStatus::Succeeded
            && self
                .scene_jobs
                .iter()
                .all(|j| j.status == JobStatus::Succeeded)
    }

    /// Number of jobs served by the offline generator.
    pub fn fallback_count(&self) -> usize {
        std::iter::once(&self.speech_job)
            .chain(std::iter::once(&self.avatar_job))
            .chain(self.scene_jobs.iter())
            .filter(|j| j.fell_back)
            .count()
    }

    pub fn scene_job_ids(&self) -> Vec<String> {
        self.scene_jobs.iter().map(|j| j.id.to_string()).collect()
    }
}
