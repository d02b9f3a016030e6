//! Construction of the three adapters from configuration.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use vgen_models::{JobKind, ProviderKind};

use crate::adapter::GenerationAdapter;
use crate::backend::GenerationBackend;
use crate::config::{FallbackPolicy, ProvidersConfig};
use crate::error::{ProviderError, ProviderResult};
use crate::http::build_client;
use crate::offline::OfflineGenerator;
use crate::params::{AvatarParams, SceneParams, SpeechParams};
use crate::vendors::{
    AzureTts, DeepBrainAvatar, GoogleTts, RunwayScene, SynthesiaAvatar, ZebracatScene,
};

/// How one adapter will serve jobs.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub kind: JobKind,
    pub provider: ProviderKind,
    /// `vendor` or `offline`
    pub mode: &'static str,
}

/// Speech, avatar and scene adapters sharing one configuration.
pub struct Providers {
    pub speech: GenerationAdapter<SpeechParams>,
    pub avatar: GenerationAdapter<AvatarParams>,
    pub scene: GenerationAdapter<SceneParams>,
    config: ProvidersConfig,
}

impl Providers {
    /// Build adapters. Under a strict policy a vendor without credentials is an error.
    pub fn from_config(config: ProvidersConfig) -> ProviderResult<Self> {
        let http = build_client(config.request_timeout)?;
        let offline = OfflineGenerator::new(config.offline_render);
        let creds = &config.credentials;
        let endpoints = &config.endpoints;

        let speech: Option<Arc<dyn GenerationBackend<SpeechParams>>> = match config.speech_provider
        {
            ProviderKind::Google => creds.google_tts_api_key.as_ref().map(|key| {
                shared(GoogleTts::new(http.clone(), key, &endpoints.google_tts))
            }),
            ProviderKind::Azure => creds
                .azure_speech_key
                .as_ref()
                .zip(creds.azure_speech_region.as_ref())
                .map(|(key, region)| {
                    shared(AzureTts::new(
                        http.clone(),
                        key,
                        endpoints.azure_for_region(region),
                    ))
                }),
            _ => None,
        };

        let avatar: Option<Arc<dyn GenerationBackend<AvatarParams>>> = match config.avatar_provider
        {
            ProviderKind::DeepBrain => creds.deepbrain_api_key.as_ref().map(|key| {
                shared(DeepBrainAvatar::new(http.clone(), key, &endpoints.deepbrain))
            }),
            ProviderKind::Synthesia => creds.synthesia_api_key.as_ref().map(|key| {
                shared(SynthesiaAvatar::new(
                    http.clone(),
                    key,
                    &endpoints.synthesia,
                    config.poll,
                ))
            }),
            _ => None,
        };

        let scene: Option<Arc<dyn GenerationBackend<SceneParams>>> = match config.scene_provider {
            ProviderKind::Zebracat => creds.zebracat_api_key.as_ref().map(|key| {
                shared(ZebracatScene::new(http.clone(), key, &endpoints.zebracat))
            }),
            ProviderKind::Runway => creds
                .runway_api_key
                .as_ref()
                .map(|key| shared(RunwayScene::new(http.clone(), key, &endpoints.runway))),
            _ => None,
        };

        Ok(Self {
            speech: assemble(JobKind::Speech, config.speech_provider, speech, &offline, config.policy)?,
            avatar: assemble(JobKind::Avatar, config.avatar_provider, avatar, &offline, config.policy)?,
            scene: assemble(JobKind::Scene, config.scene_provider, scene, &offline, config.policy)?,
            config,
        })
    }

    /// Offline adapters writing stub files; no network, no FFmpeg.
    pub fn offline(policy: FallbackPolicy) -> Self {
        let offline = OfflineGenerator::stubs_only();
        Self {
            speech: GenerationAdapter::unconfigured(
                JobKind::Speech,
                ProviderKind::Offline,
                offline.clone(),
                policy,
            ),
            avatar: GenerationAdapter::unconfigured(
                JobKind::Avatar,
                ProviderKind::Offline,
                offline.clone(),
                policy,
            ),
            scene: GenerationAdapter::unconfigured(
                JobKind::Scene,
                ProviderKind::Offline,
                offline,
                policy,
            ),
            config: ProvidersConfig::offline().with_policy(policy),
        }
    }

    /// Assemble from prebuilt adapters.
    pub fn with_adapters(
        speech: GenerationAdapter<SpeechParams>,
        avatar: GenerationAdapter<AvatarParams>,
        scene: GenerationAdapter<SceneParams>,
        config: ProvidersConfig,
    ) -> Self {
        Self {
            speech,
            avatar,
            scene,
            config,
        }
    }

    pub fn config(&self) -> &ProvidersConfig {
        &self.config
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.config.policy
    }

    pub fn status(&self) -> Vec<ProviderStatus> {
        vec![
            status_of(JobKind::Speech, self.speech.requested_provider(), self.speech.has_vendor()),
            status_of(JobKind::Avatar, self.avatar.requested_provider(), self.avatar.has_vendor()),
            status_of(JobKind::Scene, self.scene.requested_provider(), self.scene.has_vendor()),
        ]
    }
}

fn status_of(kind: JobKind, provider: ProviderKind, has_vendor: bool) -> ProviderStatus {
    ProviderStatus {
        kind,
        provider,
        mode: if has_vendor { "vendor" } else { "offline" },
    }
}

fn assemble<P>(
    kind: JobKind,
    requested: ProviderKind,
    backend: Option<Arc<dyn GenerationBackend<P>>>,
    offline: &OfflineGenerator,
    policy: FallbackPolicy,
) -> ProviderResult<GenerationAdapter<P>>
where
    P: Serialize + Send + Sync,
    OfflineGenerator: GenerationBackend<P>,
{
    match backend {
        Some(backend) => {
            info!(kind = kind.as_str(), provider = requested.as_str(), "Vendor configured");
            Ok(GenerationAdapter::new(kind, backend, offline.clone(), policy))
        }
        None if requested == ProviderKind::Offline => Ok(GenerationAdapter::unconfigured(
            kind,
            requested,
            offline.clone(),
            policy,
        )),
        None if policy == FallbackPolicy::Strict => Err(ProviderError::MissingCredentials(
            format!("{} provider {} has no credentials", kind, requested),
        )),
        None => {
            warn!(
                kind = kind.as_str(),
                provider = requested.as_str(),
                "Vendor credentials missing, using offline generator"
            );
            Ok(GenerationAdapter::unconfigured(
                kind,
                requested,
                offline.clone(),
                policy,
            ))
        }
    }
}

fn shared<P, B>(backend: B) -> Arc<dyn GenerationBackend<P>>
where
    B: GenerationBackend<P> + 'static,
{
    Arc::new(backend)
}
