//! The OpenAI provider client.

use std::fmt::Debug;

use bytes::Bytes;
use futures::TryStreamExt;

use super::{audio, completion, embedding, streaming};
use crate::audio::{
    AudioError, SpeechOptions, TranscriptionOptions, TranslationOptions,
};
use crate::client::{
    CompletionClient, EmbeddingsClient, SpeechClient, TranscriptionClient, TranslationClient,
};
use crate::completion::{ChatCompletionOptions, CompletionError};
use crate::conversation::Conversation;
use crate::embeddings::{EmbeddingError, EmbeddingOptions};
use crate::message::Message;
use crate::streaming::CompletionStream;

const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

pub struct ClientBuilder<'a> {
    api_key: &'a str,
    base_url: &'a str,
    http_client: Option<reqwest::Client>,
    default_completion_options: ChatCompletionOptions,
    default_embedding_options: EmbeddingOptions,
    default_speech_options: SpeechOptions,
    default_transcription_options: TranscriptionOptions,
    default_translation_options: TranslationOptions,
}

impl<'a> ClientBuilder<'a> {
    pub fn new(api_key: &'a str) -> Self {
        Self {
            api_key,
            base_url: OPENAI_API_BASE_URL,
            http_client: None,
            default_completion_options: ChatCompletionOptions::default(),
            default_embedding_options: EmbeddingOptions::default(),
            default_speech_options: SpeechOptions::default(),
            default_transcription_options: TranscriptionOptions::default(),
            default_translation_options: TranslationOptions::default(),
        }
    }

    pub fn base_url(mut self, base_url: &'a str) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn custom_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Defaults merged under every completion call's options.
    pub fn default_completion_options(mut self, options: ChatCompletionOptions) -> Self {
        self.default_completion_options = options;
        self
    }

    pub fn default_embedding_options(mut self, options: EmbeddingOptions) -> Self {
        self.default_embedding_options = options;
        self
    }

    pub fn default_speech_options(mut self, options: SpeechOptions) -> Self {
        self.default_speech_options = options;
        self
    }

    pub fn default_transcription_options(mut self, options: TranscriptionOptions) -> Self {
        self.default_transcription_options = options;
        self
    }

    pub fn default_translation_options(mut self, options: TranslationOptions) -> Self {
        self.default_translation_options = options;
        self
    }

    pub fn build(self) -> Client {
        Client {
            base_url: self.base_url.to_string(),
            api_key: self.api_key.to_string(),
            http_client: self.http_client.unwrap_or_default(),
            default_completion_options: self.default_completion_options,
            default_embedding_options: self.default_embedding_options,
            default_speech_options: self.default_speech_options,
            default_transcription_options: self.default_transcription_options,
            default_translation_options: self.default_translation_options,
        }
    }
}

/// The OpenAI client. The API key is bound at construction; build a new
/// client to use a different credential.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    default_completion_options: ChatCompletionOptions,
    default_embedding_options: EmbeddingOptions,
    default_speech_options: SpeechOptions,
    default_transcription_options: TranscriptionOptions,
    default_translation_options: TranslationOptions,
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("default_completion_options", &self.default_completion_options)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new OpenAI client builder.
    ///
    /// # Example
    /// ```
    /// use generative::providers::openai::{Client, self};
    ///
    /// let openai = Client::builder("your-openai-api-key")
    ///     .build();
    /// ```
    pub fn builder(api_key: &str) -> ClientBuilder<'_> {
        ClientBuilder::new(api_key)
    }

    /// Create a new OpenAI client. For more control, use the `builder` method.
    pub fn new(api_key: &str) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new OpenAI client from the `OPENAI_API_KEY` environment
    /// variable. Panics if the variable is not set.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        Self::new(&api_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.http_client.post(url).bearer_auth(&self.api_key)
    }

    async fn send_completion_request(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, CompletionError> {
        tracing::debug!(target: "generative", "OpenAI completion request: {}", body);
        let response = self.post("chat/completions").json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::ProviderError {
                status,
                body: response.text().await?,
            });
        }
        Ok(response)
    }
}

impl CompletionClient for Client {
    async fn complete(
        &self,
        conversation: &mut Conversation,
        options: Option<&ChatCompletionOptions>,
    ) -> Result<Message, CompletionError> {
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_completion_options);
        let body = completion::create_request_body(conversation, &options, false)?;

        let response = self.send_completion_request(&body).await?;
        let text = response.text().await?;
        tracing::debug!(target: "generative", "OpenAI completion response: {}", text);

        let parsed: completion::CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                target: "generative",
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI token usage"
            );
        }

        let message = Message::try_from(parsed)?;
        conversation.push_assistant(message.clone());
        Ok(message)
    }

    async fn complete_stream<'a>(
        &'a self,
        conversation: &'a mut Conversation,
        options: Option<&'a ChatCompletionOptions>,
    ) -> Result<CompletionStream<'a>, CompletionError> {
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_completion_options);
        let body = completion::create_request_body(conversation, &options, true)?;

        let response = self.send_completion_request(&body).await?;
        let byte_stream = response.bytes_stream().map_err(CompletionError::from);
        let chunks = streaming::decode(byte_stream);
        Ok(CompletionStream::new(chunks, conversation))
    }
}

impl EmbeddingsClient for Client {
    async fn embed(
        &self,
        text: &str,
        options: Option<&EmbeddingOptions>,
    ) -> Result<Vec<f64>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidArgument(
                "text must not be empty".to_string(),
            ));
        }
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_embedding_options);
        let body = embedding::create_request_body(text, &options);

        let response = self.post("embeddings").json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::ProviderError {
                status,
                body: response.text().await?,
            });
        }

        let parsed: embedding::EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;
        parsed.into_vector()
    }
}

impl SpeechClient for Client {
    async fn speech(
        &self,
        text: &str,
        options: Option<&SpeechOptions>,
    ) -> Result<Bytes, AudioError> {
        if text.is_empty() {
            return Err(AudioError::InvalidArgument(
                "text must not be empty".to_string(),
            ));
        }
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_speech_options);
        let body = audio::create_speech_request_body(text, &options);

        let response = self.post("audio/speech").json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::ProviderError {
                status,
                body: response.text().await?,
            });
        }
        Ok(response.bytes().await?)
    }
}

impl TranscriptionClient for Client {
    async fn transcribe(
        &self,
        filename: &str,
        data: Vec<u8>,
        options: Option<&TranscriptionOptions>,
    ) -> Result<String, AudioError> {
        if data.is_empty() {
            return Err(AudioError::InvalidArgument(
                "audio data must not be empty".to_string(),
            ));
        }
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_transcription_options);
        let form = audio::create_transcription_form(filename, data, &options);

        let response = self
            .post("audio/transcriptions")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::ProviderError {
                status,
                body: response.text().await?,
            });
        }

        let parsed: audio::TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AudioError::MalformedResponse(e.to_string()))?;
        Ok(parsed.text)
    }
}

impl TranslationClient for Client {
    async fn translate(
        &self,
        filename: &str,
        data: Vec<u8>,
        options: Option<&TranslationOptions>,
    ) -> Result<String, AudioError> {
        if data.is_empty() {
            return Err(AudioError::InvalidArgument(
                "audio data must not be empty".to_string(),
            ));
        }
        let options = options
            .cloned()
            .unwrap_or_default()
            .merge_over(&self.default_translation_options);
        let form = audio::create_translation_form(filename, data, &options);

        let response = self
            .post("audio/translations")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::ProviderError {
                status,
                body: response.text().await?,
            });
        }

        let parsed: audio::TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AudioError::MalformedResponse(e.to_string()))?;
        Ok(parsed.text)
    }
}
