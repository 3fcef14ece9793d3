//! Chatterbox voice-cloning TTS, multilingual TTS and voice conversion.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Longest text the multilingual model accepts in one generation call.
pub const MAX_TEXT_LENGTH: usize = 1000;

/// Largest source recording accepted for voice conversion (10 MiB).
pub const MAX_SOURCE_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Languages supported by the multilingual model, as `(code, name)`.
pub static SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ms", "Malay"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("tr", "Turkish"),
    ("zh", "Chinese"),
];

/// Normalise and validate a multilingual language id.
pub fn normalize_language(language_id: &str) -> Result<&'static str, CoreError> {
    let wanted = language_id.trim().to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| *code == wanted)
        .map(|(code, _)| *code)
        .ok_or_else(|| {
            let supported: Vec<&str> = SUPPORTED_LANGUAGES.iter().map(|(c, _)| *c).collect();
            CoreError::Validation(format!(
                "Unsupported language '{language_id}'. Supported: {}",
                supported.join(", ")
            ))
        })
}

/// Kind of job stored in the `speech_projects` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechProjectType {
    Tts,
    MultilingualTts,
    VoiceConversion,
}

impl SpeechProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeechProjectType::Tts => "tts",
            SpeechProjectType::MultilingualTts => "multilingual_tts",
            SpeechProjectType::VoiceConversion => "voice_conversion",
        }
    }

    /// Remote function that performs this kind of job.
    pub fn remote_function(self) -> &'static str {
        match self {
            SpeechProjectType::Tts => "process_chatterbox_tts",
            SpeechProjectType::MultilingualTts => "process_chatterbox_multilingual",
            SpeechProjectType::VoiceConversion => "process_voice_conversion",
        }
    }
}

/// Sampling controls shared by both Chatterbox TTS models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SamplingParams {
    #[validate(range(min = 0.0, max = 2.0))]
    pub exaggeration: f64,
    #[validate(range(min = 0.05, max = 5.0))]
    pub temperature: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub cfg_weight: f64,
    #[validate(range(min = 1.0, max = 5.0))]
    pub repetition_penalty: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_p: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f64,
}

impl SamplingParams {
    /// Defaults for the English voice-cloning model.
    pub fn english() -> Self {
        Self {
            exaggeration: 0.5,
            temperature: 0.8,
            cfg_weight: 0.5,
            repetition_penalty: 1.2,
            min_p: 0.05,
            top_p: 1.0,
        }
    }

    /// Defaults for the multilingual model, which needs a stronger
    /// repetition penalty.
    pub fn multilingual() -> Self {
        Self {
            repetition_penalty: 2.0,
            ..Self::english()
        }
    }
}
