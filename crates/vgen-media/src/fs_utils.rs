//! Filesystem helpers for artifacts in the content directory.
//!
//! Writers go through a temporary sibling and a rename so readers never observe a
//! half-written artifact.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Create the parent directory of `path` if missing.
pub async fn ensure_parent(path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Temporary sibling used while `path` is being produced.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Write `bytes` to `path` atomically.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> MediaResult<()> {
    ensure_parent(path).await?;
    let tmp = partial_path(path);
    fs::write(&tmp, bytes).await?;
    finish_partial(&tmp, path).await
}

/// Copy `src` over `dst` atomically.
pub async fn copy_atomic(src: &Path, dst: &Path) -> MediaResult<()> {
    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    ensure_parent(dst).await?;
    let tmp = partial_path(dst);
    fs::copy(src, &tmp).await?;
    finish_partial(&tmp, dst).await
}

/// Rename a finished temporary file into place, removing it on failure.
pub async fn finish_partial(tmp: &Path, dst: &Path) -> MediaResult<()> {
    match fs::rename(tmp, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename, copying instead: {} -> {}",
                tmp.display(),
                dst.display()
            );
            let copied = fs::copy(tmp, dst).await;
            remove_if_exists(tmp).await;
            copied.map(|_| ()).map_err(MediaError::from)
        }
        Err(e) => {
            remove_if_exists(tmp).await;
            Err(MediaError::from(e))
        }
    }
}

/// Best-effort removal; missing files are fine.
pub async fn remove_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}
