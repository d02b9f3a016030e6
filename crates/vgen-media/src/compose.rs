//! Final video composition.
//!
//! A [`CompositionPlan`] describes everything FFmpeg needs: the narration track, the
//! avatar clip and the ordered scene clips with their on-screen durations. Building the
//! filter graph is pure; [`FfmpegCompositor`] runs it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info};

use vgen_models::request::{DEFAULT_BACKGROUND_COLOR, DEFAULT_PIP_SIZE_RATIO};
use vgen_models::{CompositionMode, EncodingConfig, PipPosition, Resolution};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{
    chroma_key, concat_video, ffmpeg_color, fit_to_frame, overlay_position, pip_width, PIP_MARGIN,
};
use crate::fs_utils::{ensure_parent, finish_partial, partial_path, remove_if_exists};
use crate::probe::get_duration;

/// One scene clip and how long it stays on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneClip {
    pub path: PathBuf,
    pub duration: f64,
}

impl SceneClip {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipLayout {
    pub position: PipPosition,
    /// Avatar width as a fraction of the frame width
    pub size_ratio: f64,
}

impl Default for PipLayout {
    fn default() -> Self {
        Self {
            position: PipPosition::default(),
            size_ratio: DEFAULT_PIP_SIZE_RATIO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompositionPlan {
    pub mode: CompositionMode,
    pub resolution: Resolution,
    pub narration: PathBuf,
    pub avatar: PathBuf,
    /// Scene clips in narration order
    pub scenes: Vec<SceneClip>,
    pub total_duration: f64,
    /// Avatar backdrop color removed in picture-in-picture mode
    pub chroma_color: String,
    pub pip: PipLayout,
    pub encoding: EncodingConfig,
}

impl CompositionPlan {
    pub fn new(
        mode: CompositionMode,
        resolution: Resolution,
        narration: impl Into<PathBuf>,
        avatar: impl Into<PathBuf>,
        total_duration: f64,
    ) -> Self {
        Self {
            mode,
            resolution,
            narration: narration.into(),
            avatar: avatar.into(),
            scenes: Vec::new(),
            total_duration,
            chroma_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            pip: PipLayout::default(),
            encoding: EncodingConfig::default(),
        }
    }

    pub fn with_scenes(mut self, scenes: Vec<SceneClip>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn with_pip(mut self, position: PipPosition, size_ratio: f64) -> Self {
        self.pip = PipLayout {
            position,
            size_ratio,
        };
        self
    }

    pub fn with_chroma_color(mut self, color: impl Into<String>) -> Self {
        self.chroma_color = color.into();
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    /// Whether the avatar clip is an input of the render.
    pub fn uses_avatar(&self) -> bool {
        self.mode == CompositionMode::PictureInPicture || self.scenes.is_empty()
    }

    /// Files the render reads.
    pub fn input_files(&self) -> Vec<&Path> {
        let mut files = vec![self.narration.as_path()];
        files.extend(self.scenes.iter().map(|s| s.path.as_path()));
        if self.uses_avatar() {
            files.push(self.avatar.as_path());
        }
        files
    }

    pub fn validate(&self) -> MediaResult<()> {
        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return Err(MediaError::invalid_plan(format!(
                "total duration must be positive, got {}",
                self.total_duration
            )));
        }
        if let Some(scene) = self
            .scenes
            .iter()
            .find(|s| !s.duration.is_finite() || s.duration < 0.0)
        {
            return Err(MediaError::invalid_plan(format!(
                "scene {} has invalid duration {}",
                scene.path.display(),
                scene.duration
            )));
        }
        if self.mode == CompositionMode::PictureInPicture {
            if !(self.pip.size_ratio > 0.0 && self.pip.size_ratio <= 1.0) {
                return Err(MediaError::invalid_plan(format!(
                    "pip size ratio must be in (0, 1], got {}",
                    self.pip.size_ratio
                )));
            }
            if ffmpeg_color(&self.chroma_color).is_none() {
                return Err(MediaError::invalid_plan(format!(
                    "chroma color must be #RRGGBB, got {:?}",
                    self.chroma_color
                )));
            }
        }
        Ok(())
    }

    /// Shortest on-screen time for a scene: one frame.
    fn min_scene_duration(&self) -> f64 {
        1.0 / self.encoding.fps.max(1) as f64
    }

    /// Chains that bring scene inputs `first_input..` to frame size and concatenate them
    /// into `[label]`.
    fn scene_background(&self, first_input: usize, label: &str) -> Vec<String> {
        let (w, h) = self.resolution.dimensions();
        let fit = fit_to_frame(w, h, self.encoding.fps);
        let min = self.min_scene_duration();

        let mut chains = Vec::with_capacity(self.scenes.len() + 1);
        let mut labels = Vec::with_capacity(self.scenes.len());
        for (i, scene) in self.scenes.iter().enumerate() {
            chains.push(format!(
                "[{}:v]{fit},trim=duration={:.3},setpts=PTS-STARTPTS[s{i}]",
                first_input + i,
                scene.duration.max(min)
            ));
            labels.push(format!("s{i}"));
        }
        chains.push(concat_video(&labels, label));
        chains
    }

    /// The `-filter_complex` graph. Its video output is labelled `[out]`.
    pub fn filter_graph(&self) -> MediaResult<String> {
        self.validate()?;
        let (w, h) = self.resolution.dimensions();
        let fps = self.encoding.fps;
        let scene_count = self.scenes.len();

        let chains = match self.mode {
            CompositionMode::SceneSwitching if scene_count == 0 => {
                // Avatar fills the frame when there is nothing to switch to.
                vec![format!("[1:v]{}[out]", fit_to_frame(w, h, fps))]
            }
            CompositionMode::SceneSwitching => self.scene_background(1, "out"),
            CompositionMode::PictureInPicture => {
                let mut chains = if scene_count == 0 {
                    vec!["[1:v]setsar=1[bg]".to_string()]
                } else {
                    self.scene_background(1, "bg")
                };
                let avatar_input = 1 + scene_count.max(1);
                let color = ffmpeg_color(&self.chroma_color)
                    .ok_or_else(|| MediaError::invalid_plan("invalid chroma color"))?;
                chains.push(format!(
                    "[{avatar_input}:v]{},scale={}:-2[pip]",
                    chroma_key(&color),
                    pip_width(w, self.pip.size_ratio)
                ));
                chains.push(format!(
                    "[bg][pip]overlay={}:format=auto[out]",
                    overlay_position(self.pip.position, PIP_MARGIN)
                ));
                chains
            }
        };
        Ok(chains.join(";"))
    }

    /// Full FFmpeg invocation writing an MP4 to `output`.
    pub fn to_command(&self, output: &Path) -> MediaResult<FfmpegCommand> {
        let graph = self.filter_graph()?;
        let (w, h) = self.resolution.dimensions();
        let total = self.total_duration;

        let mut cmd = FfmpegCommand::new(output).input(&self.narration);
        for scene in &self.scenes {
            cmd = cmd.looped_input(&scene.path, scene.duration.max(self.min_scene_duration()));
        }
        match self.mode {
            CompositionMode::SceneSwitching if self.scenes.is_empty() => {
                cmd = cmd.looped_input(&self.avatar, total);
            }
            CompositionMode::SceneSwitching => {}
            CompositionMode::PictureInPicture => {
                if self.scenes.is_empty() {
                    cmd = cmd.lavfi(
                        format!("color=c=black:s={w}x{h}:r={}", self.encoding.fps),
                        total,
                    );
                }
                cmd = cmd.looped_input(&self.avatar, total);
            }
        }

        Ok(cmd
            .filter_complex(graph)
            .map("[out]")
            .map("0:a")
            .duration(total)
            .encoding(&self.encoding)
            .shortest()
            .output_args(["-f", "mp4"]))
    }
}

/// Renders composition plans and measures media.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Duration of an audio or video file in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Render `plan` to `output`. Nothing is left at `output` on failure.
    async fn compose(
        &self,
        plan: &CompositionPlan,
        output: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()>;
}

/// [`Compositor`] backed by the ffmpeg/ffprobe binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegCompositor {
    timeout_secs: Option<u64>,
}

impl FfmpegCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        get_duration(path).await
    }

    async fn compose(
        &self,
        plan: &CompositionPlan,
        output: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()> {
        plan.validate()?;
        if let Some(missing) = plan.input_files().into_iter().find(|p| !p.exists()) {
            return Err(MediaError::FileNotFound(missing.to_path_buf()));
        }

        ensure_parent(output).await?;
        let tmp = partial_path(output);
        let cmd = plan.to_command(&tmp)?;

        let mut runner = FfmpegRunner::new();
        if let Some(rx) = cancel {
            runner = runner.with_cancel(rx);
        }
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        info!(
            mode = plan.mode.as_str(),
            scenes = plan.scenes.len(),
            duration = plan.total_duration,
            "Composing {}",
            output.display()
        );

        let total = plan.total_duration;
        let result = runner
            .run_with_progress(&cmd, move |p| {
                debug!("compose progress {:.0}%", p.fraction(total) * 100.0);
            })
            .await;

        if let Err(e) = result {
            remove_if_exists(&tmp).await;
            return Err(e);
        }
        finish_partial(&tmp, output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(mode: CompositionMode, scenes: usize) -> CompositionPlan {
        let clips = (0..scenes)
            .map(|i| SceneClip::new(format!("/c/scene{i}.mp4"), 2.5))
            .collect();
        CompositionPlan::new(mode, Resolution::P720, "/c/speech.mp3", "/c/avatar.mp4", 7.5)
            .with_scenes(clips)
    }

    #[test]
    fn test_scene_switching_graph() {
        let graph = plan(CompositionMode::SceneSwitching, 3).filter_graph().unwrap();
        assert!(graph.starts_with("[1:v]scale=1280:720:force_original_aspect_ratio=decrease"));
        assert!(graph.contains("[3:v]"));
        assert!(graph.contains("trim=duration=2.500"));
        assert!(graph.ends_with("[s0][s1][s2]concat=n=3:v=1:a=0[out]"));
        assert!(!graph.contains("colorkey"));
    }

    #[test]
    fn test_scene_switching_without_scenes_uses_avatar() {
        let p = plan(CompositionMode::SceneSwitching, 0);
        assert!(p.uses_avatar());
        let graph = p.filter_graph().unwrap();
        assert!(graph.starts_with("[1:v]scale=1280:720"));
        assert!(graph.ends_with("[out]"));

        let args = p.to_command(Path::new("/c/out.mp4")).unwrap().build_args();
        assert!(args.join(" ").contains("-stream_loop -1 -t 7.500 -i /c/avatar.mp4"));
    }

    #[test]
    fn test_picture_in_picture_graph() {
        let p = plan(CompositionMode::PictureInPicture, 2).with_pip(PipPosition::BottomRight, 0.3);
        let graph = p.filter_graph().unwrap();
        assert!(graph.contains("concat=n=2:v=1:a=0[bg]"));
        assert!(graph.contains("[3:v]colorkey=0x00FF00:0.3:0.2,scale=384:-2[pip]"));
        assert!(graph.ends_with("[bg][pip]overlay=W-w-20:H-h-20:format=auto[out]"));

        let args = p.to_command(Path::new("/c/out.mp4")).unwrap().build_args();
        let inputs: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(
            inputs,
            vec!["/c/speech.mp3", "/c/scene0.mp4", "/c/scene1.mp4", "/c/avatar.mp4"]
        );
    }

    #[test]
    fn test_picture_in_picture_black_background() {
        let p = plan(CompositionMode::PictureInPicture, 0);
        let graph = p.filter_graph().unwrap();
        assert!(graph.starts_with("[1:v]setsar=1[bg]"));
        assert!(graph.contains("[2:v]colorkey"));

        let joined = p.to_command(Path::new("/c/out.mp4")).unwrap().build_args().join(" ");
        assert!(joined.contains("-f lavfi -t 7.500 -i color=c=black:s=1280x720:r=30"));
    }

    #[test]
    fn test_command_maps_narration_and_encoding() {
        let joined = plan(CompositionMode::SceneSwitching, 1)
            .to_command(Path::new("/c/out.mp4"))
            .unwrap()
            .build_args()
            .join(" ");
        assert!(joined.contains("-map [out] -map 0:a -t 7.500"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(joined.contains("-shortest"));
        assert!(joined.ends_with("-f mp4 /c/out.mp4"));
    }

    #[test]
    fn test_zero_length_scene_gets_one_frame() {
        let p = CompositionPlan::new(
            CompositionMode::SceneSwitching,
            Resolution::P480,
            "a.mp3",
            "b.mp4",
            1.0,
        )
        .with_scenes(vec![SceneClip::new("s.mp4", 0.0), SceneClip::new("t.mp4", 1.0)]);
        assert!(p.filter_graph().unwrap().contains("trim=duration=0.033"));
    }

    #[test]
    fn test_validation() {
        let mut p = plan(CompositionMode::PictureInPicture, 1);
        p.total_duration = 0.0;
        assert!(matches!(p.validate(), Err(MediaError::InvalidPlan(_))));

        let p = plan(CompositionMode::PictureInPicture, 1).with_pip(PipPosition::TopLeft, 1.5);
        assert!(p.validate().is_err());

        let p = plan(CompositionMode::PictureInPicture, 1).with_chroma_color("green");
        assert!(p.validate().is_err());

        // Chroma color only matters when the avatar is keyed.
        let p = plan(CompositionMode::SceneSwitching, 1).with_chroma_color("green");
        assert!(p.validate().is_ok());
    }

    #[tokio::test]
    async fn test_compose_reports_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let p = CompositionPlan::new(
            CompositionMode::SceneSwitching,
            Resolution::P720,
            dir.path().join("speech.mp3"),
            dir.path().join("avatar.mp4"),
            3.0,
        );
        let out = dir.path().join("final.mp4");
        let err = FfmpegCompositor::new().compose(&p, &out, None).await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
        assert!(!out.exists());
    }
}
