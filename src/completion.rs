//! Completion options and the error taxonomy shared across providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Errors
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("HttpError: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Json error (e.g.: serialization, deserialization)
    #[error("JsonError: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed local input (e.g.: empty role, empty function name)
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// Options requested a capability the target provider/model cannot satisfy
    #[error("UnsupportedFeature: {0}")]
    UnsupportedFeature(String),

    /// Non-success status returned by the provider, with the response body
    #[error("ProviderError: {status}: {body}")]
    ProviderError {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Undecodable success response body
    #[error("MalformedResponse: {0}")]
    MalformedResponse(String),

    /// Undecodable frame in a streaming response
    #[error("MalformedStream: {0}")]
    MalformedStream(String),

    /// The stream ended without the provider's explicit termination signal
    #[error("UnexpectedEndOfStream: stream closed without a termination signal")]
    UnexpectedEndOfStream,

    /// The operation was cancelled before completion
    #[error("Cancelled")]
    Cancelled,
}

/// A function/tool schema declared to the provider for a completion call.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the function's parameters.
    pub parameters: serde_json::Value,
}

/// Response format hint for providers that support constrained output.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Options for a chat completion call.
///
/// A client can carry default options; per-call options are merged over the
/// defaults with [ChatCompletionOptions::merge_over] (per-call fields win).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChatCompletionOptions {
    /// Model identifier; the provider's default model when unset.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u64>,
    pub stop: Option<Vec<String>>,
    /// End-user identifier forwarded to providers that accept one.
    pub user: Option<String>,
    pub response_format: Option<ResponseFormat>,
    /// Function/tool schemas available for this call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDeclaration>,
    /// Additional provider-specific parameters merged into the request body.
    pub additional_params: Option<serde_json::Value>,
}

impl ChatCompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn function(mut self, function: FunctionDeclaration) -> Self {
        self.functions.push(function);
        self
    }

    pub fn functions(self, functions: Vec<FunctionDeclaration>) -> Self {
        functions
            .into_iter()
            .fold(self, |options, function| options.function(function))
    }

    pub fn additional_params(mut self, params: serde_json::Value) -> Self {
        self.additional_params = match self.additional_params {
            Some(existing) => Some(crate::json_utils::merge(existing, params)),
            None => Some(params),
        };
        self
    }

    /// Merge these per-call options over client defaults: any field set here
    /// wins; unset fields fall back to the default's value.
    pub fn merge_over(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            stop: self.stop.clone().or_else(|| defaults.stop.clone()),
            user: self.user.clone().or_else(|| defaults.user.clone()),
            response_format: self
                .response_format
                .clone()
                .or_else(|| defaults.response_format.clone()),
            functions: if self.functions.is_empty() {
                defaults.functions.clone()
            } else {
                self.functions.clone()
            },
            additional_params: self
                .additional_params
                .clone()
                .or_else(|| defaults.additional_params.clone()),
        }
    }
}
