//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory holding every artifact as `{id}.{ext}`
    pub content_dir: PathBuf,
    /// Maximum scene jobs in flight within a single request
    pub max_scene_parallel: usize,
    /// Maximum assembly requests running at once
    pub max_concurrent_requests: usize,
    /// Upper bound on a single FFmpeg composition
    pub compose_timeout: Duration,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("./content"),
            max_scene_parallel: 3,
            max_concurrent_requests: 2,
            compose_timeout: Duration::from_secs(1800),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            content_dir: std::env::var("VGEN_CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./content")),
            max_scene_parallel: std::env::var("VGEN_MAX_SCENE_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(3),
            max_concurrent_requests: std::env::var("VGEN_MAX_CONCURRENT_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(2),
            compose_timeout: Duration::from_secs(
                std::env::var("VGEN_COMPOSE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1800),
            ),
            shutdown_timeout: Duration::from_secs(
                std::env::var("VGEN_SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Config rooted at `dir`, other values default.
    pub fn with_content_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: dir.into(),
            ..Self::default()
        }
    }
}
