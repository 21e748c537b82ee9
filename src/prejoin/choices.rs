use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PreJoinError;

/// Language codes the translation backend understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "en-us")]
    EnUs,
    #[serde(rename = "en-in")]
    EnIn,
    #[serde(rename = "hi")]
    Hi,
    #[serde(rename = "fr")]
    Fr,
    #[serde(rename = "es")]
    Es,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::EnUs,
        Language::EnIn,
        Language::Hi,
        Language::Fr,
        Language::Es,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::EnUs => "en-us",
            Language::EnIn => "en-in",
            Language::Hi => "hi",
            Language::Fr => "fr",
            Language::Es => "es",
        }
    }

    /// Human-readable label for selection controls
    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::EnUs => "English (US)",
            Language::EnIn => "English (India)",
            Language::Hi => "Hindi",
            Language::Fr => "French",
            Language::Es => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unsupported language code: {}", s))
    }
}

/// Voice used for synthesized translation output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
}

/// Translation preferences chosen before joining.
///
/// Serialized as `{"inputLang":"en","outputLang":"hi","gender":"female"}`, both as
/// credential metadata and in translation start requests. Snake-case keys are
/// accepted too, since configuration keys are case-folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSettings {
    #[serde(alias = "input_lang")]
    pub input_lang: Language,
    #[serde(alias = "output_lang")]
    pub output_lang: Language,
    pub gender: VoiceGender,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            input_lang: Language::En,
            output_lang: Language::Hi,
            gender: VoiceGender::Female,
        }
    }
}

impl TranslationSettings {
    /// Encode as the opaque metadata string attached to credential requests
    pub fn to_metadata(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Display name and device preferences for one session.
///
/// The username is trimmed and guaranteed non-empty. Once handed to the
/// controller the value is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChoices {
    username: String,
    pub video_enabled: bool,
    pub audio_enabled: bool,
    pub audio_device_id: String,
    pub video_device_id: String,
}

impl UserChoices {
    /// Camera and microphone default to enabled on the default devices
    pub fn new(username: &str) -> Result<Self, PreJoinError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(PreJoinError::EmptyUsername);
        }

        Ok(Self {
            username: username.to_string(),
            video_enabled: true,
            audio_enabled: true,
            audio_device_id: String::new(),
            video_device_id: String::new(),
        })
    }

    pub fn with_video(mut self, enabled: bool) -> Self {
        self.video_enabled = enabled;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    pub fn with_devices(mut self, video_device_id: &str, audio_device_id: &str) -> Self {
        self.video_device_id = video_device_id.to_string();
        self.audio_device_id = audio_device_id.to_string();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
