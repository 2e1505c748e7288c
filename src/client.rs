//! Per-capability client traits.
//!
//! Each provider client implements the traits for the capabilities its API
//! exposes; callers that only need one capability can take `impl
//! CompletionClient` and stay provider-agnostic. Capabilities compose
//! independently, there is no umbrella trait.

use std::future::Future;

use bytes::Bytes;

use crate::audio::{AudioError, SpeechOptions, TranscriptionOptions, TranslationOptions};
use crate::completion::{ChatCompletionOptions, CompletionError};
use crate::conversation::Conversation;
use crate::embeddings::{EmbeddingError, EmbeddingOptions};
use crate::message::Message;
use crate::streaming::CompletionStream;

/// Chat completion, blocking and streaming.
pub trait CompletionClient {
    /// Request a completion for the conversation, append the assistant turn,
    /// and return it.
    fn complete(
        &self,
        conversation: &mut Conversation,
        options: Option<&ChatCompletionOptions>,
    ) -> impl Future<Output = Result<Message, CompletionError>> + Send;

    /// Request a streaming completion. The returned stream yields text
    /// fragments and appends the finalized assistant turn once the provider
    /// signals termination.
    fn complete_stream<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        options: Option<&'a ChatCompletionOptions>,
    ) -> impl Future<Output = Result<CompletionStream<'a>, CompletionError>> + Send;
}

/// Text embedding.
pub trait EmbeddingsClient {
    fn embed(
        &self,
        text: &str,
        options: Option<&EmbeddingOptions>,
    ) -> impl Future<Output = Result<Vec<f64>, EmbeddingError>> + Send;
}

/// Speech synthesis: text in, encoded audio out.
pub trait SpeechClient {
    fn speech(
        &self,
        text: &str,
        options: Option<&SpeechOptions>,
    ) -> impl Future<Output = Result<Bytes, AudioError>> + Send;
}

/// Audio transcription: audio in, text in the source language out.
pub trait TranscriptionClient {
    fn transcribe(
        &self,
        filename: &str,
        data: Vec<u8>,
        options: Option<&TranscriptionOptions>,
    ) -> impl Future<Output = Result<String, AudioError>> + Send;
}

/// Audio translation: audio in, English text out.
pub trait TranslationClient {
    fn translate(
        &self,
        filename: &str,
        data: Vec<u8>,
        options: Option<&TranslationOptions>,
    ) -> impl Future<Output = Result<String, AudioError>> + Send;
}
