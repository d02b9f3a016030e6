//! Azure Cognitive Services speech synthesis.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use vgen_media::fs_utils::write_atomic;
use vgen_models::ProviderKind;

use crate::backend::GenerationBackend;
use crate::error::{ProviderError, ProviderResult};
use crate::http::send;
use crate::params::SpeechParams;

const VENDOR: &str = "azure";
const OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";

pub struct AzureTts {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AzureTts {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn build_ssml(params: &SpeechParams) -> String {
    format!(
        "<speak version='1.0' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape_xml(&params.language_code),
        escape_xml(&params.voice_id),
        escape_xml(&params.text)
    )
}

#[async_trait]
impl GenerationBackend<SpeechParams> for AzureTts {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    async fn generate(&self, params: &SpeechParams, output: &Path) -> ProviderResult<()> {
        let response = send(
            VENDOR,
            self.http
                .post(format!("{}/cognitiveservices/v1", self.base_url))
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .header("Content-Type", "application/ssml+xml")
                .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
                .body(build_ssml(params)),
        )
        .await?;

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ProviderError::invalid_response(VENDOR, "empty audio body"));
        }
        write_atomic(output, &audio).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(text: &str) -> SpeechParams {
        SpeechParams {
            text: text.into(),
            language_code: "zh-HK".into(),
            voice_id: "zh-HK-HiuMaanNeural".into(),
        }
    }

    #[test]
    fn test_ssml_escapes_text() {
        let ssml = build_ssml(&params("Tom & Jerry <3"));
        assert_eq!(
            ssml,
            "<speak version='1.0' xml:lang='zh-HK'><voice name='zh-HK-HiuMaanNeural'>\
             Tom &amp; Jerry &lt;3</voice></speak>"
        );
    }

    #[tokio::test]
    async fn test_synthesize_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cognitiveservices/v1"))
            .and(header("Ocp-Apim-Subscription-Key", "azkey"))
            .and(header("X-Microsoft-OutputFormat", OUTPUT_FORMAT))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("speech.mp3");
        let tts = AzureTts::new(build_client(Duration::from_secs(5)).unwrap(), "azkey", server.uri());
        tts.generate(&params("你好"), &out).await.unwrap();

        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"mp3bytes");
    }
}
