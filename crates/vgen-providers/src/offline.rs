//! Deterministic local generator used when no vendor is available.

use std::path::Path;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use vgen_analysis::estimate_narration_seconds;
use vgen_media::filters::ffmpeg_color;
use vgen_media::PlaceholderRenderer;
use vgen_models::request::DEFAULT_BACKGROUND_COLOR;
use vgen_models::ProviderKind;

use crate::backend::GenerationBackend;
use crate::error::ProviderResult;
use crate::params::{AvatarParams, SceneParams, SpeechParams};

/// Writes placeholder artifacts: silence for speech, a chroma-colored clip for the avatar
/// and a prompt-colored clip per scene.
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator {
    renderer: PlaceholderRenderer,
}

impl OfflineGenerator {
    pub fn new(render: bool) -> Self {
        Self {
            renderer: PlaceholderRenderer::new(render),
        }
    }

    pub fn stubs_only() -> Self {
        Self {
            renderer: PlaceholderRenderer::stubs_only(),
        }
    }
}

/// Stable color for a scene prompt, as `0xRRGGBB`.
pub fn scene_color(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    format!("0x{:02X}{:02X}{:02X}", digest[0], digest[1], digest[2])
}

#[async_trait]
impl GenerationBackend<SpeechParams> for OfflineGenerator {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Offline
    }

    async fn generate(&self, params: &SpeechParams, output: &Path) -> ProviderResult<()> {
        let seconds = estimate_narration_seconds(&params.text);
        Ok(self.renderer.silence(output, seconds).await?)
    }
}

#[async_trait]
impl GenerationBackend<AvatarParams> for OfflineGenerator {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Offline
    }

    async fn generate(&self, params: &AvatarParams, output: &Path) -> ProviderResult<()> {
        let color = ffmpeg_color(&params.background_color)
            .or_else(|| ffmpeg_color(DEFAULT_BACKGROUND_COLOR))
            .unwrap_or_else(|| "0x00FF00".to_string());
        Ok(self
            .renderer
            .color_clip(
                output,
                &color,
                params.duration_secs,
                params.resolution,
                true,
            )
            .await?)
    }
}

#[async_trait]
impl GenerationBackend<SceneParams> for OfflineGenerator {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Offline
    }

    async fn generate(&self, params: &SceneParams, output: &Path) -> ProviderResult<()> {
        Ok(self
            .renderer
            .color_clip(
                output,
                &scene_color(&params.prompt),
                params.duration_secs,
                params.resolution,
                false,
            )
            .await?)
    }
}
