//! Runway text-to-video rendering.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use vgen_models::ProviderKind;

use crate::backend::GenerationBackend;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{download_artifact, send_json};
use crate::params::{vendor_seconds, SceneParams};

const VENDOR: &str = "runway";
/// Frame rate Runway renders at.
const RUNWAY_FPS: u32 = 30;

pub struct RunwayScene {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: Option<String>,
}

impl RunwayScene {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend<SceneParams> for RunwayScene {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Runway
    }

    async fn generate(&self, params: &SceneParams, output: &Path) -> ProviderResult<()> {
        let body = json!({
            "prompt": params.prompt,
            "num_frames": vendor_seconds(params.duration_secs) * RUNWAY_FPS,
            "style_preset": params.style,
        });

        let response: GenerationResponse = send_json(
            VENDOR,
            self.http
                .post(format!("{}/v1/text-to-video", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;

        let url = response
            .output
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ProviderError::invalid_response(VENDOR, "missing output"))?;
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

    #[tokio::test]
    async fn test_frames_from_duration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-video"))
            .and(header("authorization", "Bearer rk"))
            .and(body_partial_json(json!({ "num_frames": 150, "style_preset": "anime" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "output": format!("{}/r.mp4", server.uri()) })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"rw".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("scene.mp4");
        RunwayScene::new(build_client(Duration::from_secs(5)).unwrap(), "rk", server.uri())
            .generate(
                &SceneParams {
                    prompt: "Scene related to robots".into(),
                    style: "anime".into(),
                    duration_secs: 4.5,
                    resolution: Resolution::P1080,
                    order: 2,
                },
                &out,
            )
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"rw");
    }
}
