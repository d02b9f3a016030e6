//! Zebracat text-to-scene rendering.

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

const VENDOR: &str = "zebracat";

pub struct ZebracatScene {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SceneResponse {
    url: Option<String>,
}

impl ZebracatScene {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend<SceneParams> for ZebracatScene {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Zebracat
    }

    async fn generate(&self, params: &SceneParams, output: &Path) -> ProviderResult<()> {
        let (width, height) = params.resolution.dimensions();
        let body = json!({
            "prompt": params.prompt,
            "style": params.style,
            "duration": vendor_seconds(params.duration_secs),
            "resolution": { "width": width, "height": height },
            "format": "mp4",
        });

        let response: SceneResponse = send_json(
            VENDOR,
            self.http
                .post(format!("{}/v1/scenes", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;

        let url = response
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ProviderError::invalid_response(VENDOR, "missing url"))?;
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
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scene_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scenes"))
            .and(body_partial_json(json!({
                "prompt": "Scene related to ocean",
                "duration": 3,
                "resolution": { "width": 1280, "height": 720 },
                "format": "mp4"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": format!("{}/s/1.mp4", server.uri()) })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s/1.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"scene".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("scene.mp4");
        let backend =
            ZebracatScene::new(build_client(Duration::from_secs(5)).unwrap(), "zk", server.uri());
        backend
            .generate(
                &SceneParams {
                    prompt: "Scene related to ocean".into(),
                    style: "realistic".into(),
                    duration_secs: 2.4,
                    resolution: Resolution::P720,
                    order: 0,
                },
                &out,
            )
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"scene");
    }
}
