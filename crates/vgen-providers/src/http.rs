//! Shared HTTP plumbing for vendor backends.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use vgen_media::fs_utils::write_atomic;

use crate::error::{ProviderError, ProviderResult};

/// Longest vendor error body kept in errors and logs.
const MAX_ERROR_BODY: usize = 512;

pub fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("vgen/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Network)
}

/// Send `request` and fail on any non-success status.
pub async fn send(vendor: &'static str, request: RequestBuilder) -> ProviderResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(ProviderError::Status {
        vendor,
        status: status.as_u16(),
        body,
    })
}

/// Send `request` and decode a JSON body.
pub async fn send_json<T: DeserializeOwned>(
    vendor: &'static str,
    request: RequestBuilder,
) -> ProviderResult<T> {
    let response = send(vendor, request).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::invalid_response(vendor, e.to_string()))
}

/// Fetch `url` into `output`.
///
/// A failed download leaves a zero-byte file behind and is not an error: the vendor did
/// its part, and composition decides what to do with an empty artifact.
pub async fn download_artifact(
    http: &Client,
    vendor: &'static str,
    url: &str,
    output: &Path,
) -> ProviderResult<u64> {
    debug!("Downloading {} artifact from {}", vendor, url);
    match fetch(http, vendor, url).await {
        Ok(bytes) => {
            write_atomic(output, &bytes).await?;
            Ok(bytes.len() as u64)
        }
        Err(e) => {
            warn!("{} download failed, leaving empty artifact: {}", vendor, e);
            write_atomic(output, &[]).await?;
            Ok(0)
        }
    }
}

async fn fetch(http: &Client, vendor: &'static str, url: &str) -> ProviderResult<Vec<u8>> {
    let response = send(vendor, http.get(url)).await?;
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/a.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a.mp4");
        let http = build_client(Duration::from_secs(5)).unwrap();
        let n = download_artifact(&http, "test", &format!("{}/files/a.mp4", server.uri()), &out)
            .await
            .unwrap();

        assert_eq!(n, 5);
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_empty_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("b.mp4");
        let http = build_client(Duration::from_secs(5)).unwrap();
        let n = download_artifact(&http, "test", &format!("{}/missing", server.uri()), &out)
            .await
            .unwrap();

        assert_eq!(n, 0);
        assert!(out.exists());
        assert_eq!(tokio::fs::metadata(&out).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_status_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let http = build_client(Duration::from_secs(5)).unwrap();
        let err = send("test", http.post(server.uri())).await.unwrap_err();
        match err {
            ProviderError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
