//! Stand-in artifacts for offline generation.
//!
//! With FFmpeg available the renderer produces real silent audio and solid-color clips
//! of the requested length. Otherwise, or when rendering fails, a minimal stub file is
//! written so downstream stages always find an artifact.

use std::path::Path;
use tracing::{debug, warn};

use vgen_models::{EncodingConfig, Resolution};

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::fs_utils::{ensure_parent, finish_partial, partial_path, remove_if_exists, write_atomic};

/// MPEG-1 Layer III frame header followed by padding.
pub const MP3_STUB: [u8; 16] = [
    0xFF, 0xFB, 0x90, 0x64, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// A lone `ftyp` box (isom, minor 0x200, compatible isom/mp41).
pub const MP4_STUB: [u8; 24] = [
    0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
    0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Audio,
    Video,
}

impl StubKind {
    pub fn bytes(&self) -> &'static [u8] {
        match self {
            StubKind::Audio => &MP3_STUB,
            StubKind::Video => &MP4_STUB,
        }
    }
}

/// Write the stub for `kind` to `path`.
pub async fn write_stub(path: &Path, kind: StubKind) -> MediaResult<()> {
    write_atomic(path, kind.bytes()).await
}

/// Produces placeholder media, rendering with FFmpeg when allowed and available.
#[derive(Debug, Clone)]
pub struct PlaceholderRenderer {
    render: bool,
    encoding: EncodingConfig,
    timeout_secs: u64,
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PlaceholderRenderer {
    pub fn new(render: bool) -> Self {
        Self {
            render,
            encoding: EncodingConfig::for_placeholder(),
            timeout_secs: 120,
        }
    }

    /// Never invokes FFmpeg.
    pub fn stubs_only() -> Self {
        Self::new(false)
    }

    fn can_render(&self) -> bool {
        self.render && check_ffmpeg().is_ok()
    }

    /// Silent MP3 of `seconds` length.
    pub async fn silence(&self, path: &Path, seconds: f64) -> MediaResult<()> {
        if self.can_render() {
            let tmp = partial_path(path);
            let cmd = FfmpegCommand::new(&tmp)
                .lavfi("anullsrc=r=44100:cl=mono", seconds.max(0.1))
                .audio_codec("libmp3lame")
                .audio_bitrate("64k")
                .output_args(["-f", "mp3"]);
            if self.render_to(&cmd, &tmp, path).await {
                return Ok(());
            }
        }
        write_stub(path, StubKind::Audio).await
    }

    /// Solid `color` MP4 of `seconds` length, with a silent audio track when
    /// `with_audio` is set.
    pub async fn color_clip(
        &self,
        path: &Path,
        color: &str,
        seconds: f64,
        resolution: Resolution,
        with_audio: bool,
    ) -> MediaResult<()> {
        if self.can_render() {
            let (w, h) = resolution.dimensions();
            let seconds = seconds.max(0.1);
            let tmp = partial_path(path);
            let mut cmd = FfmpegCommand::new(&tmp).lavfi(
                format!("color=c={color}:s={w}x{h}:r={}", self.encoding.fps),
                seconds,
            );
            if with_audio {
                cmd = cmd
                    .lavfi("anullsrc=r=44100:cl=stereo", seconds)
                    .map("0:v")
                    .map("1:a");
            } else {
                cmd = cmd.map("0:v");
            }
            let cmd = cmd
                .encoding(&self.encoding)
                .shortest()
                .output_args(["-f", "mp4"]);
            if self.render_to(&cmd, &tmp, path).await {
                return Ok(());
            }
        }
        write_stub(path, StubKind::Video).await
    }

    /// Run `cmd` into `tmp` and move it to `path`. False when anything failed.
    async fn render_to(&self, cmd: &FfmpegCommand, tmp: &Path, path: &Path) -> bool {
        if let Err(e) = ensure_parent(path).await {
            warn!("Placeholder directory unavailable: {}", e);
            return false;
        }
        let runner = FfmpegRunner::new().with_timeout(self.timeout_secs);
        match runner.run(cmd).await {
            Ok(()) => match finish_partial(tmp, path).await {
                Ok(()) => {
                    debug!("Rendered placeholder {}", path.display());
                    true
                }
                Err(e) => {
                    warn!("Failed to place rendered placeholder: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("Placeholder render failed, writing stub instead: {}", e);
                remove_if_exists(tmp).await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stub_audio() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("speech.mp3");
        PlaceholderRenderer::stubs_only()
            .silence(&path, 3.0)
            .await
            .unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0xFF, 0xFB, 0x90, 0x64]);
    }

    #[tokio::test]
    async fn test_stub_video() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.mp4");
        PlaceholderRenderer::stubs_only()
            .color_clip(&path, "0x336699", 2.0, Resolution::P720, false)
            .await
            .unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert_eq!(&bytes[4..8], b"ftyp");
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_stub_box_size_matches_length() {
        let declared = u32::from_be_bytes([MP4_STUB[0], MP4_STUB[1], MP4_STUB[2], MP4_STUB[3]]);
        assert_eq!(declared as usize, MP4_STUB.len());
    }
}
