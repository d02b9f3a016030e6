//! Google Cloud Text-to-Speech.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use vgen_media::fs_utils::write_atomic;
use vgen_models::ProviderKind;

use crate::backend::GenerationBackend;
use crate::error::{ProviderError, ProviderResult};
use crate::http::send_json;
use crate::params::SpeechParams;

const VENDOR: &str = "google";

pub struct GoogleTts {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

impl GoogleTts {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Language prefix of a voice name: `yue-HK-Standard-B` -> `yue-HK`.
fn voice_language_code(voice_id: &str) -> Option<String> {
    let mut parts = voice_id.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lang), Some(region), Some(_)) if !lang.is_empty() && !region.is_empty() => {
            Some(format!("{lang}-{region}"))
        }
        _ => None,
    }
}

#[async_trait]
impl GenerationBackend<SpeechParams> for GoogleTts {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn generate(&self, params: &SpeechParams, output: &Path) -> ProviderResult<()> {
        let language_code =
            voice_language_code(&params.voice_id).unwrap_or_else(|| params.language_code.clone());
        let body = json!({
            "input": { "text": params.text },
            "voice": { "languageCode": language_code, "name": params.voice_id },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        let response: SynthesizeResponse = send_json(
            VENDOR,
            self.http
                .post(format!("{}/v1/text:synthesize", self.base_url))
                .query(&[("key", self.api_key.as_str())])
                .json(&body),
        )
        .await?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(response.audio_content.as_bytes())
            .map_err(|e| ProviderError::invalid_response(VENDOR, format!("audioContent: {e}")))?;
        if audio.is_empty() {
            return Err(ProviderError::invalid_response(VENDOR, "empty audioContent"));
        }
        write_atomic(output, &audio).await?;
        Ok(())
    }
}
