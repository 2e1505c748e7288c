//! Embedding wire types for the OpenAI API.

use serde::Deserialize;
use serde_json::json;

use crate::embeddings::{EmbeddingError, EmbeddingOptions};
use crate::json_utils;

pub const DEFAULT_MODEL: &str = super::TEXT_EMBEDDING_3_SMALL;

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f64>,
}

impl EmbeddingResponse {
    pub(crate) fn into_vector(self) -> Result<Vec<f64>, EmbeddingError> {
        self.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                EmbeddingError::MalformedResponse("response has no embedding data".to_string())
            })
    }
}

pub(crate) fn create_request_body(text: &str, options: &EmbeddingOptions) -> serde_json::Value {
    let mut body = json!({
        "model": options.model.as_deref().unwrap_or(DEFAULT_MODEL),
        "input": text,
    });
    if let Some(dimensions) = options.dimensions {
        json_utils::merge_inplace(&mut body, json!({ "dimensions": dimensions }));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = create_request_body("hello", &EmbeddingOptions::new().dimensions(256));
        assert_eq!(
            body,
            json!({ "model": "text-embedding-3-small", "input": "hello", "dimensions": 256 })
        );
    }

    #[test]
    fn test_response_into_vector() {
        let raw = r#"{ "data": [{ "embedding": [0.1, -0.2, 0.3], "index": 0 }] }"#;
        let response: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_vector().unwrap(), vec![0.1, -0.2, 0.3]);

        let empty: EmbeddingResponse = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert!(matches!(
            empty.into_vector(),
            Err(EmbeddingError::MalformedResponse(_))
        ));
    }
}
