//! Static catalogs of supported languages, voices and avatars.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct VoiceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub language: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct AvatarInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub language: &'static str,
}

pub const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "zh-CN", name: "普通話（中文簡體）" },
    LanguageInfo { code: "zh-HK", name: "粵語（香港中文）" },
    LanguageInfo { code: "en-US", name: "英語（美式）" },
];

const GOOGLE_VOICES: &[VoiceInfo] = &[
    VoiceInfo { id: "zh-CN-Wavenet-B", name: "Mandarin male", gender: Gender::Male, language: "zh-CN" },
    VoiceInfo { id: "zh-CN-Wavenet-A", name: "Mandarin female", gender: Gender::Female, language: "zh-CN" },
    VoiceInfo { id: "yue-HK-Standard-B", name: "Cantonese male", gender: Gender::Male, language: "zh-HK" },
    VoiceInfo { id: "yue-HK-Standard-A", name: "Cantonese female", gender: Gender::Female, language: "zh-HK" },
    VoiceInfo { id: "en-US-Neural2-D", name: "English male", gender: Gender::Male, language: "en-US" },
    VoiceInfo { id: "en-US-Neural2-F", name: "English female", gender: Gender::Female, language: "en-US" },
];

const AZURE_VOICES: &[VoiceInfo] = &[
    VoiceInfo { id: "zh-CN-YunxiNeural", name: "Yunxi", gender: Gender::Male, language: "zh-CN" },
    VoiceInfo { id: "zh-CN-XiaoxiaoNeural", name: "Xiaoxiao", gender: Gender::Female, language: "zh-CN" },
    VoiceInfo { id: "zh-HK-WanLungNeural", name: "WanLung", gender: Gender::Male, language: "zh-HK" },
    VoiceInfo { id: "zh-HK-HiuMaanNeural", name: "HiuMaan", gender: Gender::Female, language: "zh-HK" },
    VoiceInfo { id: "en-US-GuyNeural", name: "Guy", gender: Gender::Male, language: "en-US" },
    VoiceInfo { id: "en-US-JennyNeural", name: "Jenny", gender: Gender::Female, language: "en-US" },
];

pub const AVATARS: &[AvatarInfo] = &[
    AvatarInfo { id: "zh-f-01", name: "劉芳", gender: Gender::Female, language: "zh-CN" },
    AvatarInfo { id: "zh-f-02", name: "王美", gender: Gender::Female, language: "zh-CN" },
    AvatarInfo { id: "zh-m-01", name: "李明", gender: Gender::Male, language: "zh-CN" },
    AvatarInfo { id: "zh-m-02", name: "張偉", gender: Gender::Male, language: "zh-CN" },
    AvatarInfo { id: "hk-f-01", name: "王美麗", gender: Gender::Female, language: "zh-HK" },
    AvatarInfo { id: "hk-f-02", name: "陳小姐", gender: Gender::Female, language: "zh-HK" },
    AvatarInfo { id: "hk-m-01", name: "陳大文", gender: Gender::Male, language: "zh-HK" },
    AvatarInfo { id: "hk-m-02", name: "黃先生", gender: Gender::Male, language: "zh-HK" },
    AvatarInfo { id: "en-f-01", name: "Sarah", gender: Gender::Female, language: "en-US" },
    AvatarInfo { id: "en-f-02", name: "Emily", gender: Gender::Female, language: "en-US" },
    AvatarInfo { id: "en-m-01", name: "John", gender: Gender::Male, language: "en-US" },
    AvatarInfo { id: "en-m-02", name: "Michael", gender: Gender::Male, language: "en-US" },
];

pub fn is_supported_language(code: &str) -> bool {
    LANGUAGES.iter().any(|l| l.code == code)
}

/// Voices offered by a speech provider for a language. Unknown providers have none.
pub fn voices_for(provider: ProviderKind, language: &str) -> Vec<&'static VoiceInfo> {
    let voices = match provider {
        ProviderKind::Google => GOOGLE_VOICES,
        ProviderKind::Azure => AZURE_VOICES,
        _ => &[],
    };
    voices.iter().filter(|v| v.language == language).collect()
}

pub fn avatars_for(language: &str) -> Vec<&'static AvatarInfo> {
    AVATARS.iter().filter(|a| a.language == language).collect()
}

/// Language code carried by a voice id, e.g. `zh-HK-HiuMaanNeural` -> `zh-HK`.
///
/// Google's Cantonese voices use the `yue-HK` prefix, which maps back to `zh-HK`.
pub fn language_of_voice(voice_id: &str) -> Option<&'static str> {
    GOOGLE_VOICES
        .iter()
        .chain(AZURE_VOICES.iter())
        .find(|v| v.id == voice_id)
        .map(|v| v.language)
        .or_else(|| {
            let mut parts = voice_id.splitn(3, '-');
            let code = match (parts.next()?, parts.next()?) {
                ("yue", "HK") => "zh-HK".to_string(),
                (lang, region) => format!("{lang}-{region}"),
            };
            LANGUAGES.iter().find(|l| l.code == code).map(|l| l.code)
        })
}
