//! Audio options and error type: speech synthesis, transcription, translation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("HttpError: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Json error (e.g.: serialization, deserialization)
    #[error("JsonError: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed local input (e.g.: empty text, empty file)
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// Non-success status returned by the provider, with the response body
    #[error("ProviderError: {status}: {body}")]
    ProviderError {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Undecodable success response body
    #[error("MalformedResponse: {0}")]
    MalformedResponse(String),
}

/// Output container for synthesized speech.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechResponseFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

/// Options for speech synthesis, merged over client defaults per call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SpeechOptions {
    pub model: Option<String>,
    pub voice: Option<String>,
    /// Playback speed multiplier (provider range, typically 0.25–4.0).
    pub speed: Option<f64>,
    pub response_format: Option<SpeechResponseFormat>,
}

impl SpeechOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn response_format(mut self, format: SpeechResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn merge_over(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            voice: self.voice.clone().or_else(|| defaults.voice.clone()),
            speed: self.speed.or(defaults.speed),
            response_format: self
                .response_format
                .clone()
                .or_else(|| defaults.response_format.clone()),
        }
    }
}

/// Options for audio transcription, merged over client defaults per call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TranscriptionOptions {
    pub model: Option<String>,
    /// ISO-639-1 language of the input audio, as a decoding hint.
    pub language: Option<String>,
    /// Free-text prompt guiding the model's style or spelling.
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
}

impl TranscriptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn merge_over(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            language: self.language.clone().or_else(|| defaults.language.clone()),
            prompt: self.prompt.clone().or_else(|| defaults.prompt.clone()),
            temperature: self.temperature.or(defaults.temperature),
        }
    }
}

/// Options for audio translation (to English), merged over client defaults
/// per call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TranslationOptions {
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
}

impl TranslationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn merge_over(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            prompt: self.prompt.clone().or_else(|| defaults.prompt.clone()),
            temperature: self.temperature.or(defaults.temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_merge_over_per_call_wins() {
        let defaults = SpeechOptions::new()
            .model("tts-1")
            .voice("alloy")
            .response_format(SpeechResponseFormat::Mp3);
        let per_call = SpeechOptions::new().voice("nova").speed(1.25);

        let merged = per_call.merge_over(&defaults);
        assert_eq!(merged.model.as_deref(), Some("tts-1"));
        assert_eq!(merged.voice.as_deref(), Some("nova"));
        assert_eq!(merged.speed, Some(1.25));
        assert_eq!(merged.response_format, Some(SpeechResponseFormat::Mp3));
    }

    #[test]
    fn test_transcription_merge_over_falls_back() {
        let defaults = TranscriptionOptions::new().model("whisper-1").language("pl");
        let per_call = TranscriptionOptions::new().prompt("Names: Chataize");

        let merged = per_call.merge_over(&defaults);
        assert_eq!(merged.model.as_deref(), Some("whisper-1"));
        assert_eq!(merged.language.as_deref(), Some("pl"));
        assert_eq!(merged.prompt.as_deref(), Some("Names: Chataize"));
    }
}
