//! End-to-end assembly of one request.
//!
//! ```text
//! Validating -> Synthesizing -> Avataring -> SceneGenerating -> Composing -> Done
//! ```
//!
//! Any stage may end in `Failed` (client, integrity or strict vendor errors) or `Aborted`
//! (cancellation). Cancellation is checked between stages and races every in-flight
//! vendor call, whose result is then dropped.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tokio::sync::{watch, Semaphore};

use vgen_analysis::{
    default_language_code, detect_script, estimate_narration_seconds, plan_segments,
    ContentAnalyzer, TextSegmenter,
};
use vgen_media::fs_utils::copy_atomic;
use vgen_media::{CompositionPlan, Compositor, MediaError, SceneClip};
use vgen_models::catalog::language_of_voice;
use vgen_models::{
    AssemblyRequest, AssemblyResult, AssemblyStage, EncodingConfig, GenerationJob, JobId, JobKind,
    ProviderKind, TimedSegment,
};
use vgen_providers::{AvatarParams, FallbackPolicy, Providers, SceneParams, SpeechParams};

use crate::config::WorkerConfig;
use crate::error::{AssemblyError, WorkerResult};
use crate::logging::JobLogger;
use crate::store::{ensure_artifact, ContentStore};

/// A produced artifact and the job that produced it.
struct Artifact {
    job: GenerationJob,
    path: PathBuf,
}

/// Drives one request through every stage.
pub struct AssemblyOrchestrator {
    providers: Arc<Providers>,
    compositor: Arc<dyn Compositor>,
    segmenter: TextSegmenter,
    analyzer: ContentAnalyzer,
    store: ContentStore,
    encoding: EncodingConfig,
    config: WorkerConfig,
}

impl AssemblyOrchestrator {
    pub fn new(
        providers: Arc<Providers>,
        compositor: Arc<dyn Compositor>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            providers,
            compositor,
            segmenter: TextSegmenter::default(),
            analyzer: ContentAnalyzer::default(),
            store: ContentStore::new(config.content_dir.clone()),
            encoding: EncodingConfig::default(),
            config,
        }
    }

    pub fn with_segmenter(mut self, segmenter: TextSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_analyzer(mut self, analyzer: ContentAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Assemble `request` under a fresh request id.
    pub async fn run(
        &self,
        request: AssemblyRequest,
        cancel: watch::Receiver<bool>,
    ) -> WorkerResult<AssemblyResult> {
        let (stage_tx, _) = watch::channel(AssemblyStage::Validating);
        self.run_tracked(JobId::new(), request, cancel, &stage_tx).await
    }

    /// Assemble `request`, publishing every stage change on `stage_tx`.
    pub async fn run_tracked(
        &self,
        request_id: JobId,
        request: AssemblyRequest,
        cancel: watch::Receiver<bool>,
        stage_tx: &watch::Sender<AssemblyStage>,
    ) -> WorkerResult<AssemblyResult> {
        let started = Instant::now();
        let mut tracker = StageTracker::new(&request_id, stage_tx);

        let result = self
            .assemble(&request_id, &request, &cancel, &mut tracker)
            .await;

        let outcome = match &result {
            Ok(res) => {
                tracker.logger.log_completion(&format!(
                    "final video {} ({} scenes, {} fallbacks{})",
                    res.final_video_id,
                    res.scene_jobs.len(),
                    res.fallback_count(),
                    if res.degraded { ", degraded" } else { "" }
                ));
                "done"
            }
            Err(AssemblyError::Aborted) => {
                tracker.logger.log_warning("request aborted");
                tracker.finish(AssemblyStage::Aborted);
                "aborted"
            }
            Err(e) => {
                tracker
                    .logger
                    .log_error(&format!("{} ({})", e, e.class().as_str()));
                tracker.finish(AssemblyStage::Failed);
                "failed"
            }
        };

        metrics::counter!("vgen_assembly_requests_total", "outcome" => outcome).increment(1);
        metrics::histogram!("vgen_assembly_duration_seconds", "outcome" => outcome)
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn assemble(
        &self,
        request_id: &JobId,
        request: &AssemblyRequest,
        cancel: &watch::Receiver<bool>,
        tracker: &mut StageTracker<'_>,
    ) -> WorkerResult<AssemblyResult> {
        // Validating
        request.validate_request()?;
        let text = request.narration_text();
        let supplied_audio = match (text, &request.audio_reference) {
            (Some(text), _) => {
                if self.segmenter.segment(text).is_empty() {
                    return Err(AssemblyError::client("narration text has no content"));
                }
                None
            }
            (None, Some(audio)) => Some(self.store.resolve_audio(audio).await?),
            (None, None) => return Err(AssemblyError::client("narration is required")),
        };
        ensure_not_cancelled(cancel)?;

        // Synthesizing
        tracker.enter(AssemblyStage::Synthesizing);
        self.store.init().await?;
        let speech = match (text, supplied_audio) {
            (Some(text), _) => {
                let params = SpeechParams {
                    text: text.to_string(),
                    language_code: language_code(request, text),
                    voice_id: request.voice_id.clone(),
                };
                tracker.logger.log_progress(&format!(
                    "synthesizing {} chars in {}",
                    text.chars().count(),
                    params.language_code
                ));
                let adapter = &self.providers.speech;
                let mut job = adapter.new_job(&params);
                let path = self.store.job_path(&job);
                cancellable(cancel, async {
                    adapter.generate(&mut job, &params, &path).await?;
                    Ok::<_, AssemblyError>(())
                })
                .await?;
                Artifact { job, path }
            }
            (None, Some(path)) => supplied_speech(request, path)?,
            (None, None) => return Err(AssemblyError::client("narration is required")),
        };
        ensure_artifact(&speech.path, "speech").await?;

        let narration_seconds = self
            .narration_seconds(&speech.path, text.unwrap_or_default(), &tracker.logger)
            .await;
        ensure_not_cancelled(cancel)?;

        // Avataring
        tracker.enter(AssemblyStage::Avataring);
        let avatar = {
            let params = AvatarParams {
                avatar_id: request.avatar_id.clone(),
                audio_path: speech.path.clone(),
                audio_url: self
                    .providers
                    .config()
                    .audio_url(speech.job.id.as_str(), &speech.path),
                background_color: request.background_color.clone(),
                resolution: request.resolution,
                duration_secs: narration_seconds,
            };
            let adapter = &self.providers.avatar;
            let mut job = adapter.new_job(&params);
            let path = self.store.job_path(&job);
            cancellable(cancel, async {
                adapter.generate(&mut job, &params, &path).await?;
                Ok::<_, AssemblyError>(())
            })
            .await?;
            Artifact { job, path }
        };
        ensure_artifact(&avatar.path, "avatar").await?;
        ensure_not_cancelled(cancel)?;

        // SceneGenerating
        tracker.enter(AssemblyStage::SceneGenerating);
        let segments = match text {
            Some(text) => plan_segments(&self.segmenter, &self.analyzer, text, narration_seconds)?,
            None => Vec::new(),
        };
        tracker
            .logger
            .log_progress(&format!("dispatching {} scenes", segments.len()));
        let scenes = cancellable(cancel, self.generate_scenes(request, &segments)).await?;
        ensure_not_cancelled(cancel)?;

        // Composing
        tracker.enter(AssemblyStage::Composing);
        let final_video_id = request_id.to_string();
        let final_path = self.store.path_for(&final_video_id, "mp4")?;
        let clips = scenes
            .iter()
            .zip(&segments)
            .map(|(scene, segment)| SceneClip::new(&scene.path, segment.duration()))
            .collect();
        let plan = CompositionPlan::new(
            request.mode,
            request.resolution,
            &speech.path,
            &avatar.path,
            narration_seconds,
        )
        .with_scenes(clips)
        .with_pip(request.pip_position, request.pip_size_ratio)
        .with_chroma_color(&request.background_color)
        .with_encoding(self.encoding.clone());

        let degraded = self
            .compose(&plan, &avatar.path, &final_path, cancel, &tracker.logger)
            .await?;
        ensure_artifact(&final_path, "final video").await?;
        ensure_not_cancelled(cancel)?;

        tracker.enter(AssemblyStage::Done);
        Ok(AssemblyResult {
            request_id: request_id.clone(),
            mode: request.mode,
            speech_job: speech.job,
            avatar_job: avatar.job,
            scene_jobs: scenes.into_iter().map(|s| s.job).collect(),
            segments,
            narration_seconds,
            final_video_uri: final_path.to_string_lossy().to_string(),
            final_video_id,
            degraded,
            stages: tracker.stages.clone(),
            completed_at: Utc::now(),
        })
    }

    /// Probed length of the narration, or the text estimate when probing fails.
    async fn narration_seconds(&self, speech: &Path, text: &str, logger: &JobLogger) -> f64 {
        match self.compositor.probe_duration(speech).await {
            Ok(secs) if secs.is_finite() && secs > 0.0 => secs,
            Ok(secs) => {
                logger.log_warning(&format!("unusable narration duration {secs}, estimating"));
                estimate_narration_seconds(text)
            }
            Err(e) => {
                logger.log_warning(&format!("narration probe failed ({e}), estimating"));
                estimate_narration_seconds(text)
            }
        }
    }

    /// One scene job per segment, at most `max_scene_parallel` in flight, in segment order.
    async fn generate_scenes(
        &self,
        request: &AssemblyRequest,
        segments: &[TimedSegment],
    ) -> WorkerResult<Vec<Artifact>> {
        let semaphore = Semaphore::new(self.config.max_scene_parallel.max(1));
        let semaphore = &semaphore;
        let adapter = &self.providers.scene;

        let futures = segments.iter().map(|segment| async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| AssemblyError::integrity("scene pool closed"))?;

            let params = SceneParams {
                prompt: segment.scene_prompt().to_string(),
                style: request.scene_style.clone(),
                duration_secs: segment.duration(),
                resolution: request.resolution,
                order: segment.order(),
            };
            let mut job = adapter.new_job(&params);
            let path = self.store.job_path(&job);
            adapter.generate(&mut job, &params, &path).await?;
            ensure_artifact(&path, "scene").await?;
            Ok::<_, AssemblyError>((params.order, Artifact { job, path }))
        });

        let mut scenes = join_all(futures)
            .await
            .into_iter()
            .collect::<WorkerResult<Vec<_>>>()?;
        scenes.sort_by_key(|(order, _)| *order);
        Ok(scenes.into_iter().map(|(_, artifact)| artifact).collect())
    }

    /// Render the final video. Returns `true` when the avatar clip had to stand in.
    async fn compose(
        &self,
        plan: &CompositionPlan,
        avatar: &Path,
        output: &Path,
        cancel: &watch::Receiver<bool>,
        logger: &JobLogger,
    ) -> WorkerResult<bool> {
        let err = match self
            .compositor
            .compose(plan, output, Some(cancel.clone()))
            .await
        {
            Ok(()) => return Ok(false),
            Err(MediaError::Cancelled) => return Err(AssemblyError::Aborted),
            Err(e) => e,
        };

        if *cancel.borrow() {
            return Err(AssemblyError::Aborted);
        }
        if self.providers.policy() == FallbackPolicy::Strict {
            return Err(AssemblyError::Composition(err));
        }

        logger.log_warning(&format!("composition failed ({err}), using avatar clip"));
        metrics::counter!("vgen_composition_fallbacks_total", "mode" => plan.mode.as_str())
            .increment(1);
        copy_atomic(avatar, output).await.map_err(|e| {
            AssemblyError::integrity(format!("avatar fallback copy failed: {e}"))
        })?;
        Ok(true)
    }
}

/// Stage bookkeeping for one run.
struct StageTracker<'a> {
    logger: JobLogger,
    stages: Vec<AssemblyStage>,
    tx: &'a watch::Sender<AssemblyStage>,
}

impl<'a> StageTracker<'a> {
    fn new(request_id: &JobId, tx: &'a watch::Sender<AssemblyStage>) -> Self {
        let mut tracker = Self {
            logger: JobLogger::new(request_id),
            stages: Vec::new(),
            tx,
        };
        tracker.enter(AssemblyStage::Validating);
        tracker
    }

    fn enter(&mut self, stage: AssemblyStage) {
        self.stages.push(stage);
        self.logger.enter(stage);
        self.tx.send_replace(stage);
    }

    fn finish(&mut self, stage: AssemblyStage) {
        self.stages.push(stage);
        self.tx.send_replace(stage);
    }
}

/// Register pre-recorded narration as an already succeeded speech job.
fn supplied_speech(request: &AssemblyRequest, path: PathBuf) -> WorkerResult<Artifact> {
    let audio = request
        .audio_reference
        .as_ref()
        .ok_or_else(|| AssemblyError::client("audio reference is required"))?;
    let mut job = GenerationJob::new(
        JobKind::Speech,
        ProviderKind::Supplied,
        json!({ "audio_reference": audio }),
    );
    job.id = JobId::from_string(audio.id.clone());
    job.start()?;
    job.succeed(ProviderKind::Supplied, path.to_string_lossy())?;
    Ok(Artifact { job, path })
}

/// Explicit language, else the voice's language, else the detected script's default.
fn language_code(request: &AssemblyRequest, text: &str) -> String {
    request
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or_else(|| language_of_voice(&request.voice_id))
        .unwrap_or_else(|| default_language_code(detect_script(text)))
        .to_string()
}

fn ensure_not_cancelled(cancel: &watch::Receiver<bool>) -> WorkerResult<()> {
    if *cancel.borrow() {
        Err(AssemblyError::Aborted)
    } else {
        Ok(())
    }
}

/// Race `fut` against cancellation; a cancelled future is dropped unfinished.
async fn cancellable<T>(
    cancel: &watch::Receiver<bool>,
    fut: impl Future<Output = WorkerResult<T>>,
) -> WorkerResult<T> {
    let mut rx = cancel.clone();
    tokio::select! {
        biased;
        _ = cancelled(&mut rx) => Err(AssemblyError::Aborted),
        result = fut => result,
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use vgen_media::{MediaResult, MP4_STUB};
    use vgen_models::{AudioReference, CompositionMode, JobStatus, RequestError};
    use vgen_providers::{
        GenerationAdapter, GenerationBackend, OfflineGenerator, ProviderResult, ProvidersConfig,
    };

    /// Writes a marker file instead of running FFmpeg.
    #[derive(Default)]
    struct FakeCompositor {
        duration: Option<f64>,
        fail: bool,
        composed: AtomicUsize,
    }

    #[async_trait]
    impl Compositor for FakeCompositor {
        async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
            self.duration
                .ok_or_else(|| MediaError::invalid_media("not probeable"))
        }

        async fn compose(
            &self,
            plan: &CompositionPlan,
            output: &Path,
            _cancel: Option<watch::Receiver<bool>>,
        ) -> MediaResult<()> {
            self.composed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MediaError::ffmpeg_failed("boom", None, Some(1)));
            }
            plan.validate()?;
            tokio::fs::write(output, b"final").await?;
            Ok(())
        }
    }

    fn orchestrator(
        dir: &TempDir,
        policy: FallbackPolicy,
        compositor: Arc<FakeCompositor>,
    ) -> AssemblyOrchestrator {
        AssemblyOrchestrator::new(
            Arc::new(Providers::offline(policy)),
            compositor,
            WorkerConfig::with_content_dir(dir.path()),
        )
    }

    fn no_cancel() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        std::mem::forget(tx);
        rx
    }

    #[tokio::test]
    async fn test_text_request_reaches_done() {
        let dir = TempDir::new().unwrap();
        let compositor = Arc::new(FakeCompositor {
            duration: Some(10.0),
            ..Default::default()
        });
        let orch = orchestrator(&dir, FallbackPolicy::BestEffort, compositor.clone());

        let request = AssemblyRequest::from_text(
            "Hello world. This is a test.\nSecond line about oceans.",
            "en-US-JennyNeural",
            "en-f-01",
        );
        let result = orch.run(request, no_cancel()).await.unwrap();

        assert!(result.is_complete());
        assert_eq!(result.stages.last(), Some(&AssemblyStage::Done));
        assert_eq!(result.scene_jobs.len(), 2);
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[1].end_sec, 10.0);
        assert_eq!(result.narration_seconds, 10.0);
        assert!(!result.degraded);
        assert_eq!(compositor.composed.load(Ordering::SeqCst), 1);
        assert_eq!(
            tokio::fs::read(&result.final_video_uri).await.unwrap(),
            b"final"
        );
        for job in result.scene_jobs.iter() {
            assert!(dir.path().join(job.artifact_name()).exists());
        }
    }

    /// Scene backend where later segments finish first.
    #[derive(Default)]
    struct ReversedScenes {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl GenerationBackend<SceneParams> for ReversedScenes {
        fn provider(&self) -> ProviderKind {
            ProviderKind::Runway
        }

        async fn generate(&self, params: &SceneParams, output: &Path) -> ProviderResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = 10 * (6 - params.order.min(5)) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            tokio::fs::write(output, MP4_STUB).await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_scenes_keep_narration_order_under_bounded_parallelism() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(ReversedScenes::default());
        let base = Providers::offline(FallbackPolicy::Strict);
        let scene = GenerationAdapter::new(
            JobKind::Scene,
            backend.clone(),
            OfflineGenerator::stubs_only(),
            FallbackPolicy::Strict,
        );
        let providers = Providers::with_adapters(
            base.speech,
            base.avatar,
            scene,
            ProvidersConfig::offline().with_policy(FallbackPolicy::Strict),
        );
        let config = WorkerConfig {
            max_scene_parallel: 2,
            ..WorkerConfig::with_content_dir(dir.path())
        };
        let orch = AssemblyOrchestrator::new(
            Arc::new(providers),
            Arc::new(FakeCompositor {
                duration: Some(10.0),
                ..Default::default()
            }),
            config,
        );

        let request = AssemblyRequest::from_text(
            "Cats sleep all day.\nDogs run in parks.\nBirds sing at dawn.\nFish swim in reefs.\nTrees grow tall.",
            "en-US-JennyNeural",
            "en-f-01",
        );
        let result = orch.run(request, no_cancel()).await.unwrap();

        assert_eq!(result.scene_jobs.len(), 5);
        for (i, job) in result.scene_jobs.iter().enumerate() {
            assert_eq!(job.request_params["order"], i);
            assert!(!job.fell_back);
        }
        assert_eq!(backend.peak.load(Ordering::SeqCst), 2);
        assert_eq!(backend.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_background_color_is_client_error() {
        let dir = TempDir::new().unwrap();
        let compositor = Arc::new(FakeCompositor::default());
        let orch = orchestrator(&dir, FallbackPolicy::BestEffort, compositor.clone());

        let mut request = AssemblyRequest::from_text("Hello there.", "en-US-JennyNeural", "en-f-01")
            .with_mode(CompositionMode::PictureInPicture);
        request.background_color = "green".into();
        let err = orch.run(request, no_cancel()).await.unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(compositor.composed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unprobeable_narration_uses_estimate() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            &dir,
            FallbackPolicy::BestEffort,
            Arc::new(FakeCompositor::default()),
        );
        let text = "a".repeat(45);
        let request = AssemblyRequest::from_text(text.clone(), "en-US-GuyNeural", "en-m-01");
        let result = orch.run(request, no_cancel()).await.unwrap();
        assert_eq!(result.narration_seconds, estimate_narration_seconds(&text));
    }

    #[tokio::test]
    async fn test_missing_voice_is_client_error() {
        let dir = TempDir::new().unwrap();
        let compositor = Arc::new(FakeCompositor::default());
        let orch = orchestrator(&dir, FallbackPolicy::BestEffort, compositor.clone());

        let request = AssemblyRequest::from_text("Hello", "", "en-f-01");
        let err = orch.run(request, no_cancel()).await.unwrap_err();
        assert!(matches!(err, AssemblyError::Request(RequestError::MissingVoice)));
        assert_eq!(compositor.composed.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_audio_reference_skips_scenes() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("voice-1.mp3"), b"\xFF\xFB")
            .await
            .unwrap();
        let orch = orchestrator(
            &dir,
            FallbackPolicy::BestEffort,
            Arc::new(FakeCompositor {
                duration: Some(4.0),
                ..Default::default()
            }),
        );
        let audio = AudioReference {
            id: "voice-1".into(),
            ext: "mp3".into(),
        };
        let request = AssemblyRequest::from_audio(audio, "en-US-GuyNeural", "en-m-01")
            .with_mode(CompositionMode::PictureInPicture);

        let result = orch.run(request, no_cancel()).await.unwrap();
        assert!(result.scene_jobs.is_empty());
        assert_eq!(result.speech_job.id.as_str(), "voice-1");
        assert_eq!(result.speech_job.provider, ProviderKind::Supplied);
        assert_eq!(result.speech_job.status, JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_missing_audio_reference_is_client_error() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            &dir,
            FallbackPolicy::BestEffort,
            Arc::new(FakeCompositor::default()),
        );
        let audio = AudioReference {
            id: "nope".into(),
            ext: "mp3".into(),
        };
        let err = orch
            .run(AssemblyRequest::from_audio(audio, "v", "a"), no_cancel())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_composition_failure_best_effort_degrades() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            &dir,
            FallbackPolicy::BestEffort,
            Arc::new(FakeCompositor {
                fail: true,
                ..Default::default()
            }),
        );
        let request = AssemblyRequest::from_text("Hello there.", "en-US-GuyNeural", "en-m-01");
        let result = orch.run(request, no_cancel()).await.unwrap();

        assert!(result.degraded);
        let avatar = dir.path().join(result.avatar_job.artifact_name());
        assert_eq!(
            tokio::fs::read(&result.final_video_uri).await.unwrap(),
            tokio::fs::read(avatar).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_composition_failure_strict_fails() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator(
            &dir,
            FallbackPolicy::Strict,
            Arc::new(FakeCompositor {
                fail: true,
                ..Default::default()
            }),
        );
        let (stage_tx, stage_rx) = watch::channel(AssemblyStage::Validating);
        let request = AssemblyRequest::from_text("Hello there.", "en-US-GuyNeural", "en-m-01");
        let err = orch
            .run_tracked(JobId::new(), request, no_cancel(), &stage_tx)
            .await
            .unwrap_err();

        assert_eq!(err.class(), crate::error::ErrorClass::VendorError);
        assert_eq!(*stage_rx.borrow(), AssemblyStage::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_aborted() {
        let dir = TempDir::new().unwrap();
        let compositor = Arc::new(FakeCompositor::default());
        let orch = orchestrator(&dir, FallbackPolicy::BestEffort, compositor.clone());
        let (tx, rx) = watch::channel(true);

        let request = AssemblyRequest::from_text("Hello there.", "en-US-GuyNeural", "en-m-01");
        let err = orch.run(request, rx).await.unwrap_err();
        drop(tx);

        assert!(matches!(err, AssemblyError::Aborted));
        assert_eq!(compositor.composed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_language_code_resolution() {
        let mut request = AssemblyRequest::from_text("大家好", "zh-HK-HiuMaanNeural", "hk-f-01");
        assert_eq!(language_code(&request, "大家好"), "zh-HK");

        request.voice_id = "custom".into();
        assert_eq!(language_code(&request, "大家好"), "zh-CN");

        request.language = Some("en-US".into());
        assert_eq!(language_code(&request, "大家好"), "en-US");
    }
}
