//! Language, voice and avatar catalogs.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use vgen_models::catalog::{self, LANGUAGES};
use vgen_models::{AvatarInfo, Gender, LanguageInfo, ProviderKind, VoiceInfo};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [LanguageInfo],
}

pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: LANGUAGES,
    })
}

#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub language: Option<String>,
    /// Speech vendor; defaults to the configured one
    pub provider: Option<ProviderKind>,
    pub gender: Option<Gender>,
}

#[derive(Serialize)]
pub struct VoicesResponse {
    pub provider: ProviderKind,
    pub voices: Vec<&'static VoiceInfo>,
}

/// List voices for a language.
///
/// Without an explicit provider the configured speech vendor is used; when that vendor has no
/// voice catalog (offline) Google's is listed, since offline speech accepts any voice id.
pub async fn list_voices(
    State(state): State<AppState>,
    query: Result<Query<VoicesQuery>, QueryRejection>,
) -> ApiResult<Json<VoicesResponse>> {
    let Query(query) = query?;
    let language = required_language(query.language.as_deref())?;

    let provider = match query.provider {
        Some(p @ (ProviderKind::Google | ProviderKind::Azure)) => p,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "{other} is not a speech provider"
            )))
        }
        None => match state.providers().config().speech_provider {
            ProviderKind::Azure => ProviderKind::Azure,
            _ => ProviderKind::Google,
        },
    };

    let voices = catalog::voices_for(provider, language)
        .into_iter()
        .filter(|v| query.gender.map_or(true, |g| v.gender == g))
        .collect();

    Ok(Json(VoicesResponse { provider, voices }))
}

#[derive(Debug, Deserialize)]
pub struct AvatarsQuery {
    pub language: Option<String>,
    pub gender: Option<Gender>,
}

#[derive(Serialize)]
pub struct AvatarsResponse {
    pub avatars: Vec<&'static AvatarInfo>,
}

pub async fn list_avatars(
    query: Result<Query<AvatarsQuery>, QueryRejection>,
) -> ApiResult<Json<AvatarsResponse>> {
    let Query(query) = query?;
    let language = required_language(query.language.as_deref())?;

    let avatars = catalog::avatars_for(language)
        .into_iter()
        .filter(|a| query.gender.map_or(true, |g| a.gender == g))
        .collect();

    Ok(Json(AvatarsResponse { avatars }))
}

fn required_language(language: Option<&str>) -> ApiResult<&str> {
    match language.map(str::trim) {
        Some(code) if catalog::is_supported_language(code) => Ok(code),
        Some(code) if !code.is_empty() => Err(ApiError::bad_request(format!(
            "unsupported language: {code}"
        ))),
        _ => Err(ApiError::bad_request("language is required")),
    }
}
