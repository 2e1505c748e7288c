//! Audio wire types for the OpenAI API: speech, transcription, translation.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::audio::{SpeechOptions, SpeechResponseFormat, TranscriptionOptions, TranslationOptions};
use crate::json_utils;

pub const DEFAULT_SPEECH_MODEL: &str = super::TTS_1;
pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_AUDIO_MODEL: &str = super::WHISPER_1;

#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

pub(crate) fn create_speech_request_body(
    text: &str,
    options: &SpeechOptions,
) -> serde_json::Value {
    let mut body = json!({
        "model": options.model.as_deref().unwrap_or(DEFAULT_SPEECH_MODEL),
        "input": text,
        "voice": options.voice.as_deref().unwrap_or(DEFAULT_VOICE),
    });
    if let Some(speed) = options.speed {
        json_utils::merge_inplace(&mut body, json!({ "speed": speed }));
    }
    if let Some(format) = &options.response_format {
        let format = match format {
            SpeechResponseFormat::Mp3 => "mp3",
            SpeechResponseFormat::Opus => "opus",
            SpeechResponseFormat::Aac => "aac",
            SpeechResponseFormat::Flac => "flac",
            SpeechResponseFormat::Wav => "wav",
            SpeechResponseFormat::Pcm => "pcm",
        };
        json_utils::merge_inplace(&mut body, json!({ "response_format": format }));
    }
    body
}

pub(crate) fn create_transcription_form(
    filename: &str,
    data: Vec<u8>,
    options: &TranscriptionOptions,
) -> Form {
    let mut form = Form::new()
        .text(
            "model",
            options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIO_MODEL.to_string()),
        )
        .part("file", Part::bytes(data).file_name(filename.to_string()));

    if let Some(language) = &options.language {
        form = form.text("language", language.clone());
    }
    if let Some(prompt) = &options.prompt {
        form = form.text("prompt", prompt.clone());
    }
    if let Some(temperature) = options.temperature {
        form = form.text("temperature", temperature.to_string());
    }
    form
}

pub(crate) fn create_translation_form(
    filename: &str,
    data: Vec<u8>,
    options: &TranslationOptions,
) -> Form {
    let mut form = Form::new()
        .text(
            "model",
            options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIO_MODEL.to_string()),
        )
        .part("file", Part::bytes(data).file_name(filename.to_string()));

    if let Some(prompt) = &options.prompt {
        form = form.text("prompt", prompt.clone());
    }
    if let Some(temperature) = options.temperature {
        form = form.text("temperature", temperature.to_string());
    }
    form
}
