//! Chat completion wire types and request formatting for the Gemini API.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::completion::{ChatCompletionOptions, CompletionError, ResponseFormat};
use crate::conversation::Conversation;
use crate::message::{FunctionCall, Message as ChatMessage, Role};

pub const DEFAULT_MODEL: &str = super::GEMINI_1_5_FLASH;

/// Model families that reject tool declarations.
const MODELS_WITHOUT_FUNCTION_CALLING: [&str; 1] = ["gemini-1.0-pro-vision"];

pub(crate) fn supports_function_calling(model: &str) -> bool {
    !MODELS_WITHOUT_FUNCTION_CALLING
        .iter()
        .any(|family| model.starts_with(family))
}

// ================================================================
// Wire types
// ================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,
    pub parts: Vec<Part>,
}

/// One part of a content turn. Exactly one field is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<WireFunctionResponse>,
}

impl Part {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WireFunctionCall {
    pub name: String,
    /// Structured arguments object (Gemini does not stringify arguments).
    pub args: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WireFunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u64>,
    pub candidates_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}

impl TryFrom<GenerateContentResponse> for ChatMessage {
    type Error = CompletionError;

    fn try_from(response: GenerateContentResponse) -> Result<Self, Self::Error> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            CompletionError::MalformedResponse("response has no candidates".to_string())
        })?;
        let content = candidate.content.ok_or_else(|| {
            CompletionError::MalformedResponse("candidate has no content".to_string())
        })?;

        let mut text = String::new();
        let mut function_calls = vec![];
        for part in content.parts {
            if let Some(fragment) = part.text {
                text.push_str(&fragment);
            }
            if let Some(call) = part.function_call {
                function_calls.push(FunctionCall::new(
                    call.name,
                    Some(call.args.to_string()),
                )?);
            }
        }

        let content = if text.is_empty() { None } else { Some(text) };
        Ok(ChatMessage::assistant_with_calls(content, function_calls))
    }
}

// ================================================================
// Request formatting
// ================================================================

fn to_wire_contents(conversation: &Conversation) -> Result<Vec<Content>, CompletionError> {
    let mut contents = Vec::with_capacity(conversation.len());

    for message in conversation.messages() {
        if message.role == Role::System {
            // System turns go into systemInstruction, not contents.
            continue;
        }

        let role = match message.role {
            Role::Assistant => ContentRole::Model,
            _ => ContentRole::User,
        };

        let mut parts = vec![];
        if let Some(text) = &message.content {
            parts.push(Part::text(text.clone()));
        }
        for call in &message.function_calls {
            let args = match &call.arguments {
                Some(raw) => serde_json::from_str(raw).map_err(|e| {
                    CompletionError::InvalidArgument(format!(
                        "function call {} has non-JSON arguments: {e}",
                        call.name
                    ))
                })?,
                None => json!({}),
            };
            parts.push(Part {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args,
                }),
                ..Part::default()
            });
        }
        if let Some(result) = &message.function_result {
            parts.push(Part {
                function_response: Some(WireFunctionResponse {
                    name: result.name.clone(),
                    response: json!({ "content": result.content }),
                }),
                ..Part::default()
            });
        }

        contents.push(Content {
            role: Some(role),
            parts,
        });
    }

    Ok(contents)
}

/// Build the `generateContent` request body. Pure: identical inputs produce
/// an identical payload.
pub(crate) fn create_request_body(
    conversation: &Conversation,
    options: &ChatCompletionOptions,
    model: &str,
) -> Result<serde_json::Value, CompletionError> {
    if !options.functions.is_empty() && !supports_function_calling(model) {
        return Err(CompletionError::UnsupportedFeature(format!(
            "model {model} does not support function calling"
        )));
    }

    let mut body_map = serde_json::Map::new();
    body_map.insert("contents".to_string(), json!(to_wire_contents(conversation)?));

    let system_text: Vec<&str> = conversation
        .messages()
        .iter()
        .filter(|m| m.role == Role::System)
        .filter_map(|m| m.content.as_deref())
        .collect();
    if !system_text.is_empty() {
        body_map.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": system_text.join("\n") }] }),
        );
    }

    let mut generation_config = serde_json::Map::new();
    if let Some(temperature) = options.temperature {
        generation_config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(top_p) = options.top_p {
        generation_config.insert("topP".to_string(), json!(top_p));
    }
    if let Some(max_tokens) = options.max_tokens {
        generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if let Some(stop) = &options.stop {
        generation_config.insert("stopSequences".to_string(), json!(stop));
    }
    if let Some(ResponseFormat::JsonObject) = options.response_format {
        generation_config.insert("responseMimeType".to_string(), json!("application/json"));
    }
    if !generation_config.is_empty() {
        body_map.insert(
            "generationConfig".to_string(),
            serde_json::Value::Object(generation_config),
        );
    }

    if !options.functions.is_empty() {
        body_map.insert(
            "tools".to_string(),
            json!([{ "functionDeclarations": options.functions }]),
        );
    }

    let mut body = serde_json::Value::Object(body_map);
    if let Some(params) = &options.additional_params {
        crate::json_utils::merge_inplace(&mut body, params.clone());
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_splits_system_and_contents() {
        let mut conversation = Conversation::new();
        conversation.push_system("Be terse.");
        conversation.push_user("What is 2+2?");
        conversation.push_assistant(ChatMessage::assistant("4"));
        conversation.push_user("And 3+3?");

        let options = ChatCompletionOptions::new().temperature(0.1);
        let body = create_request_body(&conversation, &options, DEFAULT_MODEL).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "What is 2+2?" }] },
                    { "role": "model", "parts": [{ "text": "4" }] },
                    { "role": "user", "parts": [{ "text": "And 3+3?" }] },
                ],
                "systemInstruction": { "parts": [{ "text": "Be terse." }] },
                "generationConfig": { "temperature": 0.1 },
            })
        );
    }

    #[test]
    fn test_function_turns_map_to_call_and_response_parts() {
        let mut conversation = Conversation::new();
        conversation.push_user("What's the weather in Paris?");
        conversation.push_assistant(ChatMessage::assistant_with_calls(
            None,
            vec![FunctionCall::new(
                "get_weather",
                Some("{\"city\":\"Paris\"}".to_string()),
            )
            .unwrap()],
        ));
        conversation.push_function_result("get_weather", "12C, cloudy");

        let body = create_request_body(
            &conversation,
            &ChatCompletionOptions::new(),
            DEFAULT_MODEL,
        )
        .unwrap();

        assert_eq!(
            body["contents"],
            json!([
                { "role": "user", "parts": [{ "text": "What's the weather in Paris?" }] },
                {
                    "role": "model",
                    "parts": [{ "functionCall": { "name": "get_weather", "args": { "city": "Paris" } } }]
                },
                {
                    "role": "user",
                    "parts": [{
                        "functionResponse": {
                            "name": "get_weather",
                            "response": { "content": "12C, cloudy" }
                        }
                    }]
                },
            ])
        );
    }

    #[test]
    fn test_function_declarations_on_incapable_model_are_rejected() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        let options = ChatCompletionOptions::new().function(crate::completion::FunctionDeclaration {
            name: "add".to_string(),
            description: "Add two numbers".to_string(),
            parameters: json!({"type": "object"}),
        });

        let err =
            create_request_body(&conversation, &options, "gemini-1.0-pro-vision").unwrap_err();
        assert!(matches!(err, CompletionError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_deserialize_generate_content_response() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "4" }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 8, "candidatesTokenCount": 1, "totalTokenCount": 9 }
        }"#;

        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let response: GenerateContentResponse = serde_path_to_error::deserialize(&mut deserializer)
            .expect("deserialize GenerateContentResponse");

        let message = ChatMessage::try_from(response).unwrap();
        assert_eq!(message.content.as_deref(), Some("4"));
        assert!(message.function_calls.is_empty());
    }
}
