//! Generation job lifecycle.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Speech,
    Avatar,
    Scene,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Speech => "speech",
            JobKind::Avatar => "avatar",
            JobKind::Scene => "scene",
        }
    }

    /// File extension of the artifact this kind produces.
    pub fn extension(&self) -> &'static str {
        match self {
            JobKind::Speech => "mp3",
            JobKind::Avatar | JobKind::Scene => "mp4",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend that fulfilled (or is expected to fulfil) a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Azure,
    #[serde(rename = "deepbrain")]
    DeepBrain,
    Synthesia,
    Zebracat,
    Runway,
    /// Deterministic local placeholder generator
    Offline,
    /// Caller-supplied artifact (pre-recorded narration)
    Supplied,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Azure => "azure",
            ProviderKind::DeepBrain => "deepbrain",
            ProviderKind::Synthesia => "synthesia",
            ProviderKind::Zebracat => "zebracat",
            ProviderKind::Runway => "runway",
            ProviderKind::Offline => "offline",
            ProviderKind::Supplied => "supplied",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not yet dispatched
    #[default]
    Pending,
    /// Dispatched to a backend
    Running,
    /// Artifact written
    Succeeded,
    /// Backend gave up and no fallback was allowed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Pending -> Running -> Succeeded | Failed. Nothing returns to Pending.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Succeeded)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("job {job_id}: invalid status transition {from} -> {to}")]
pub struct JobTransitionError {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One unit of vendor (or offline) work owned by an assembly request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationJob {
    pub id: JobId,
    pub kind: JobKind,
    pub provider: ProviderKind,
    /// Request parameters as sent to the backend
    pub request_params: serde_json::Value,
    #[serde(default)]
    pub status: JobStatus,
    /// Local path of the produced artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the offline generator produced the artifact
    #[serde(default)]
    pub fell_back: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl GenerationJob {
    pub fn new(kind: JobKind, provider: ProviderKind, request_params: serde_json::Value) -> Self {
        Self {
            id: JobId::new(),
            kind,
            provider,
            request_params,
            status: JobStatus::Pending,
            result_uri: None,
            error: None,
            fell_back: false,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Artifact file name under the content directory (`{id}.{ext}`).
    pub fn artifact_name(&self) -> String {
        format!("{}.{}", self.id, self.kind.extension())
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(JobTransitionError {
                job_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Mark the job as dispatched.
    pub fn start(&mut self) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Record the produced artifact. `provider` is the backend that actually wrote it.
    pub fn succeed(
        &mut self,
        provider: ProviderKind,
        result_uri: impl Into<String>,
    ) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Succeeded)?;
        self.fell_back = provider == ProviderKind::Offline && self.provider != ProviderKind::Offline;
        self.provider = provider;
        self.result_uri = Some(result_uri.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Record a vendor error that was absorbed by a fallback.
    pub fn note_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }
}
