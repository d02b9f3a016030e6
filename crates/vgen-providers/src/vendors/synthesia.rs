//! Synthesia avatar rendering. Videos render asynchronously and are polled.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use vgen_models::ProviderKind;

use crate::backend::GenerationBackend;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{download_artifact, send_json};
use crate::params::AvatarParams;
use crate::poll::{poll_until, PollConfig, PollStatus};

const VENDOR: &str = "synthesia";

pub struct SynthesiaAvatar {
    http: Client,
    api_key: String,
    base_url: String,
    poll: PollConfig,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VideoStatus {
    status: String,
    download: Option<String>,
}

impl SynthesiaAvatar {
    pub fn new(
        http: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        poll: PollConfig,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll,
        }
    }

    async fn status(&self, video_id: &str) -> ProviderResult<PollStatus<String>> {
        let status: VideoStatus = send_json(
            VENDOR,
            self.http
                .get(format!("{}/v2/videos/{}", self.base_url, video_id))
                .bearer_auth(&self.api_key),
        )
        .await?;

        Ok(match status.status.as_str() {
            "complete" => match status.download {
                Some(url) if !url.is_empty() => PollStatus::Ready(url),
                _ => PollStatus::Failed("complete without download url".to_string()),
            },
            "failed" | "rejected" => PollStatus::Failed(format!("video {video_id} {}", status.status)),
            _ => PollStatus::Pending,
        })
    }
}

#[async_trait]
impl GenerationBackend<AvatarParams> for SynthesiaAvatar {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Synthesia
    }

    async fn generate(&self, params: &AvatarParams, output: &Path) -> ProviderResult<()> {
        let body = json!({
            "test": true,
            "title": format!("vgen {}", params.avatar_id),
            "input": [{
                "audioUrl": params.audio_url,
                "avatar": params.avatar_id,
                "background": { "color": params.background_color },
                "avatarSettings": {
                    "horizontalAlignment": "center",
                    "scale": 1.0,
                    "verticalAlignment": "center",
                },
            }],
        });

        let created: CreateResponse = send_json(
            VENDOR,
            self.http
                .post(format!("{}/v2/videos", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;
        if created.id.is_empty() {
            return Err(ProviderError::invalid_response(VENDOR, "empty video id"));
        }

        let url = poll_until(VENDOR, &self.poll, |_| self.status(&created.id)).await?;
        download_artifact(&self.http, VENDOR, &url, output).await?;
        Ok(())
    }
}
