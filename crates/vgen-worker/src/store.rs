//! Content directory: every artifact lives at `{dir}/{id}.{ext}`.

use std::path::{Path, PathBuf};

use vgen_models::{is_valid_artifact_id, AudioReference, GenerationJob};

use crate::error::{AssemblyError, WorkerResult};

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn init(&self) -> WorkerResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Path for artifact `id`. Ids outside `[A-Za-z0-9_-]+` are rejected.
    pub fn path_for(&self, id: &str, ext: &str) -> WorkerResult<PathBuf> {
        if !is_valid_artifact_id(id) {
            return Err(AssemblyError::client(format!("invalid artifact id: {id}")));
        }
        Ok(self.root.join(format!("{id}.{ext}")))
    }

    pub fn job_path(&self, job: &GenerationJob) -> PathBuf {
        self.root.join(job.artifact_name())
    }

    /// Path of `id.ext` if the file exists.
    pub async fn existing(&self, id: &str, ext: &str) -> Option<PathBuf> {
        let path = self.path_for(id, ext).ok()?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    /// Locate pre-recorded narration; a missing file is a client error.
    pub async fn resolve_audio(&self, audio: &AudioReference) -> WorkerResult<PathBuf> {
        self.existing(&audio.id, &audio.ext).await.ok_or_else(|| {
            AssemblyError::client(format!("audio reference not found: {}", audio.file_name()))
        })
    }
}

/// Fail unless the artifact a succeeded job points at is on disk.
pub async fn ensure_artifact(path: &Path, what: &str) -> WorkerResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(AssemblyError::integrity(format!(
            "{what} artifact missing at {}",
            path.display()
        ))),
    }
}
