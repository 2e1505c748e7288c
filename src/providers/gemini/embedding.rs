//! Embedding wire types for the Gemini API.

use serde::Deserialize;
use serde_json::json;

use crate::embeddings::{EmbeddingError, EmbeddingOptions};

pub const DEFAULT_MODEL: &str = super::TEXT_EMBEDDING_004;

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingValues {
    pub values: Vec<f64>,
}

impl EmbeddingResponse {
    pub(crate) fn into_vector(self) -> Result<Vec<f64>, EmbeddingError> {
        if self.embedding.values.is_empty() {
            return Err(EmbeddingError::MalformedResponse(
                "response has no embedding values".to_string(),
            ));
        }
        Ok(self.embedding.values)
    }
}

pub(crate) fn create_request_body(
    text: &str,
    options: &EmbeddingOptions,
    model: &str,
) -> serde_json::Value {
    let mut body = json!({
        "model": format!("models/{model}"),
        "content": { "parts": [{ "text": text }] },
    });
    if let Some(dimensions) = options.dimensions {
        crate::json_utils::merge_inplace(&mut body, json!({ "outputDimensionality": dimensions }));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = create_request_body("hello", &EmbeddingOptions::new(), DEFAULT_MODEL);
        assert_eq!(
            body,
            json!({
                "model": "models/text-embedding-004",
                "content": { "parts": [{ "text": "hello" }] },
            })
        );
    }

    #[test]
    fn test_response_into_vector() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{ "embedding": { "values": [0.5, -0.5] } }"#).unwrap();
        assert_eq!(response.into_vector().unwrap(), vec![0.5, -0.5]);
    }
}
