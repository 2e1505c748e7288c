//! The Gemini provider client.

use std::fmt::Debug;

use futures::TryStreamExt;

use super::{completion, embedding, streaming};
use crate::client::{CompletionClient, EmbeddingsClient};
use crate::completion::{ChatCompletionOptions, CompletionError};
use crate::conversation::Conversation;
use crate::embeddings::{EmbeddingError, EmbeddingOptions};
use crate::message::Message;
use crate::streaming::CompletionStream;

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct ClientBuilder<'a> {
    api_key: &'a str,
    base_url: &'a str,
    http_client: Option<reqwest::Client>,
    default_completion_options: ChatCompletionOptions,
    default_embedding_options: EmbeddingOptions,
}

impl<'a> ClientBuilder<'a> {
    pub fn new(api_key: &'a str) -> Self {
        Self {
            api_key,
            base_url: GEMINI_API_BASE_URL,
            http_client: None,
            default_completion_options: ChatCompletionOptions::default(),
            default_embedding_options: EmbeddingOptions::default(),
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

    pub fn default_completion_options(mut self, options: ChatCompletionOptions) -> Self {
        self.default_completion_options = options;
        self
    }

    pub fn default_embedding_options(mut self, options: EmbeddingOptions) -> Self {
        self.default_embedding_options = options;
        self
    }

    pub fn build(self) -> Client {
        Client {
            base_url: self.base_url.to_string(),
            api_key: self.api_key.to_string(),
            http_client: self.http_client.unwrap_or_default(),
            default_completion_options: self.default_completion_options,
            default_embedding_options: self.default_embedding_options,
        }
    }
}

/// The Gemini client. Authentication is a `key` query parameter, bound at
/// construction.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    default_completion_options: ChatCompletionOptions,
    default_embedding_options: EmbeddingOptions,
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
    /// Create a new Gemini client builder.
    pub fn builder(api_key: &str) -> ClientBuilder<'_> {
        ClientBuilder::new(api_key)
    }

    /// Create a new Gemini client. For more control, use the `builder` method.
    pub fn new(api_key: &str) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new Gemini client from the `GEMINI_API_KEY` environment
    /// variable. Panics if the variable is not set.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY not set");
        Self::new(&api_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}?key={}",
            self.base_url,
            path.trim_start_matches('/'),
            self.api_key
        );
        self.http_client.post(url)
    }

    fn post_sse(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}?alt=sse&key={}",
            self.base_url,
            path.trim_start_matches('/'),
            self.api_key
        );
        self.http_client.post(url)
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
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| completion::DEFAULT_MODEL.to_string());
        let body = completion::create_request_body(conversation, &options, &model)?;
        tracing::debug!(target: "generative", "Gemini completion request: {}", body);

        let response = self
            .post(&format!("v1beta/models/{model}:generateContent"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CompletionError::ProviderError { status, body: text });
        }
        tracing::debug!(target: "generative", "Gemini completion response: {}", text);

        let parsed: completion::GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
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
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| completion::DEFAULT_MODEL.to_string());
        let body = completion::create_request_body(conversation, &options, &model)?;
        tracing::debug!(target: "generative", "Gemini streaming request: {}", body);

        let response = self
            .post_sse(&format!("v1beta/models/{model}:streamGenerateContent"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::ProviderError {
                status,
                body: response.text().await?,
            });
        }

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
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| embedding::DEFAULT_MODEL.to_string());
        let body = embedding::create_request_body(text, &options, &model);

        let response = self
            .post(&format!("v1beta/models/{model}:embedContent"))
            .json(&body)
            .send()
            .await?;
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
