//! Text embedding options and error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("HttpError: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Json error (e.g.: serialization, deserialization)
    #[error("JsonError: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed local input (e.g.: empty text)
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

/// Options for an embedding call, merged over client defaults per call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EmbeddingOptions {
    /// Model identifier; the provider's default embedding model when unset.
    pub model: Option<String>,
    /// Output dimensionality, for models that support shortening.
    pub dimensions: Option<u32>,
}

impl EmbeddingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Merge these per-call options over client defaults; fields set here win.
    pub fn merge_over(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            dimensions: self.dimensions.or(defaults.dimensions),
        }
    }
}
