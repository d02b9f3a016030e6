//! DeepBrain AI Studios avatar rendering.

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

const VENDOR: &str = "deepbrain";

pub struct DeepBrainAvatar {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    video_url: Option<String>,
}

impl DeepBrainAvatar {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend<AvatarParams> for DeepBrainAvatar {
    fn provider(&self) -> ProviderKind {
        ProviderKind::DeepBrain
    }

    async fn generate(&self, params: &AvatarParams, output: &Path) -> ProviderResult<()> {
        let body = json!({
            "avatar": { "id": params.avatar_id },
            "audio": { "url": params.audio_url },
            "background": { "type": "chroma", "color": params.background_color },
            "export": { "format": "mp4", "resolution": params.resolution.as_str() },
        });

        let response: RenderResponse = send_json(
            VENDOR,
            self.http
                .post(format!("{}/v1/videos", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;

        let url = response
            .video_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ProviderError::invalid_response(VENDOR, "missing video_url"))?;
        download_artifact(&self.http, VENDOR, &url, output).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use std::time::Duration;
    use tempfile::TempDir;
    use vgen_models::Resolution;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params() -> AvatarParams {
        AvatarParams {
            avatar_id: "hk-f-01".into(),
            audio_path: "/content/s.mp3".into(),
            audio_url: "https://vgen.example/api/audio/s".into(),
            background_color: "#00FF00".into(),
            resolution: Resolution::P1080,
            duration_secs: 4.0,
        }
    }

    #[tokio::test]
    async fn test_render_and_download() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/videos"))
            .and(header("authorization", "Bearer dbkey"))
            .and(body_partial_json(json!({
                "avatar": { "id": "hk-f-01" },
                "background": { "type": "chroma", "color": "#00FF00" },
                "export": { "format": "mp4", "resolution": "1080p" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "video_url": format!("{}/out/v.mp4", server.uri()) })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/out/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"avatar".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("avatar.mp4");
        let backend =
            DeepBrainAvatar::new(build_client(Duration::from_secs(5)).unwrap(), "dbkey", server.uri());
        backend.generate(&params(), &out).await.unwrap();

        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"avatar");
    }

    #[tokio::test]
    async fn test_missing_url_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let backend =
            DeepBrainAvatar::new(build_client(Duration::from_secs(5)).unwrap(), "k", server.uri());
        let err = backend
            .generate(&params(), &dir.path().join("a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }
}
