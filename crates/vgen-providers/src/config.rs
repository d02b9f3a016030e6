//! Provider configuration.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vgen_models::ProviderKind;

use crate::error::{ProviderError, ProviderResult};
use crate::poll::PollConfig;

/// How vendor failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Substitute offline placeholders for failed vendor calls.
    #[default]
    BestEffort,
    /// Surface vendor failures to the caller.
    Strict,
}

impl FallbackPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackPolicy::BestEffort => "best_effort",
            FallbackPolicy::Strict => "strict",
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" | "besteffort" => Ok(FallbackPolicy::BestEffort),
            "strict" => Ok(FallbackPolicy::Strict),
            other => Err(ProviderError::config(format!("unknown fallback policy: {other}"))),
        }
    }
}

/// Vendor API keys. `None` means the vendor is not configured.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub google_tts_api_key: Option<String>,
    pub azure_speech_key: Option<String>,
    pub azure_speech_region: Option<String>,
    pub deepbrain_api_key: Option<String>,
    pub synthesia_api_key: Option<String>,
    pub zebracat_api_key: Option<String>,
    pub runway_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            google_tts_api_key: non_empty_env("GOOGLE_TTS_API_KEY"),
            azure_speech_key: non_empty_env("AZURE_SPEECH_KEY"),
            azure_speech_region: non_empty_env("AZURE_SPEECH_REGION"),
            deepbrain_api_key: non_empty_env("DEEPBRAIN_API_KEY"),
            synthesia_api_key: non_empty_env("SYNTHESIA_API_KEY"),
            zebracat_api_key: non_empty_env("ZEBRACAT_API_KEY"),
            runway_api_key: non_empty_env("RUNWAY_API_KEY"),
        }
    }
}

/// Vendor base URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub google_tts: String,
    /// Overrides the region-derived Azure host
    pub azure_tts: Option<String>,
    pub deepbrain: String,
    pub synthesia: String,
    pub zebracat: String,
    pub runway: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            google_tts: "https://texttospeech.googleapis.com".to_string(),
            azure_tts: None,
            deepbrain: "https://api.deepbrain.io".to_string(),
            synthesia: "https://api.synthesia.io".to_string(),
            zebracat: "https://api.zebracat.ai".to_string(),
            runway: "https://api.runwayml.com".to_string(),
        }
    }
}

impl Endpoints {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            google_tts: non_empty_env("VGEN_GOOGLE_TTS_URL").unwrap_or(defaults.google_tts),
            azure_tts: non_empty_env("VGEN_AZURE_TTS_URL"),
            deepbrain: non_empty_env("VGEN_DEEPBRAIN_URL").unwrap_or(defaults.deepbrain),
            synthesia: non_empty_env("VGEN_SYNTHESIA_URL").unwrap_or(defaults.synthesia),
            zebracat: non_empty_env("VGEN_ZEBRACAT_URL").unwrap_or(defaults.zebracat),
            runway: non_empty_env("VGEN_RUNWAY_URL").unwrap_or(defaults.runway),
        }
    }

    /// Azure host for `region` unless overridden.
    pub fn azure_for_region(&self, region: &str) -> String {
        self.azure_tts
            .clone()
            .unwrap_or_else(|| format!("https://{region}.tts.speech.microsoft.com"))
    }
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub policy: FallbackPolicy,
    pub speech_provider: ProviderKind,
    pub avatar_provider: ProviderKind,
    pub scene_provider: ProviderKind,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    /// Per-request vendor timeout
    pub request_timeout: Duration,
    pub poll: PollConfig,
    /// Render placeholders with FFmpeg instead of writing stubs
    pub offline_render: bool,
    /// Public origin serving `/api/audio/{id}`, used to hand audio to avatar vendors
    pub public_base_url: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            policy: FallbackPolicy::BestEffort,
            speech_provider: ProviderKind::Google,
            avatar_provider: ProviderKind::DeepBrain,
            scene_provider: ProviderKind::Zebracat,
            credentials: Credentials::default(),
            endpoints: Endpoints::default(),
            request_timeout: Duration::from_secs(120),
            poll: PollConfig::default(),
            offline_render: true,
            public_base_url: None,
        }
    }
}

impl ProvidersConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let defaults = Self::default();

        let policy = match non_empty_env("VGEN_FALLBACK_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.policy,
        };

        Ok(Self {
            policy,
            speech_provider: provider_from_env(
                "VGEN_SPEECH_PROVIDER",
                &[ProviderKind::Google, ProviderKind::Azure, ProviderKind::Offline],
                defaults.speech_provider,
            )?,
            avatar_provider: provider_from_env(
                "VGEN_AVATAR_PROVIDER",
                &[ProviderKind::DeepBrain, ProviderKind::Synthesia, ProviderKind::Offline],
                defaults.avatar_provider,
            )?,
            scene_provider: provider_from_env(
                "VGEN_SCENE_PROVIDER",
                &[ProviderKind::Zebracat, ProviderKind::Runway, ProviderKind::Offline],
                defaults.scene_provider,
            )?,
            credentials: Credentials::from_env(),
            endpoints: Endpoints::from_env(),
            request_timeout: Duration::from_secs(
                std::env::var("VGEN_VENDOR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            poll: PollConfig::from_env(),
            offline_render: std::env::var("VGEN_OFFLINE_RENDER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            public_base_url: non_empty_env("VGEN_PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string()),
        })
    }

    /// Everything offline; never touches the network.
    pub fn offline() -> Self {
        Self {
            speech_provider: ProviderKind::Offline,
            avatar_provider: ProviderKind::Offline,
            scene_provider: ProviderKind::Offline,
            offline_render: false,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reference a speech artifact the way avatar vendors can fetch it.
    pub fn audio_url(&self, speech_id: &str, local_path: &Path) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/api/audio/{speech_id}"),
            None => local_path.to_string_lossy().to_string(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn provider_from_env(
    key: &str,
    allowed: &[ProviderKind],
    default: ProviderKind,
) -> ProviderResult<ProviderKind> {
    match non_empty_env(key) {
        None => Ok(default),
        Some(value) => parse_provider(&value, allowed)
            .ok_or_else(|| ProviderError::config(format!("{key}: unsupported provider {value:?}"))),
    }
}

fn parse_provider(value: &str, allowed: &[ProviderKind]) -> Option<ProviderKind> {
    let value = value.trim().to_lowercase();
    allowed.iter().copied().find(|p| p.as_str() == value)
}
