//! Chat completion wire types and request formatting for the OpenAI API.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::completion::{ChatCompletionOptions, CompletionError, ResponseFormat};
use crate::conversation::Conversation;
use crate::json_utils;
use crate::message::{FunctionCall, Message as ChatMessage, Role};

pub const DEFAULT_MODEL: &str = super::GPT_4O;

/// Model families that reject tool declarations. Unknown models are assumed
/// capable; the provider rejects them itself if not.
const MODELS_WITHOUT_FUNCTION_CALLING: [&str; 3] =
    ["gpt-3.5-turbo-instruct", "babbage-002", "davinci-002"];

pub(crate) fn supports_function_calling(model: &str) -> bool {
    !MODELS_WITHOUT_FUNCTION_CALLING
        .iter()
        .any(|family| model.starts_with(family))
}

// ================================================================
// Wire types
// ================================================================

/// One element of the request `messages` array.
///
/// A flat struct rather than a role-tagged enum so that custom roles pass
/// through unchanged; unset fields are omitted from the payload.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolType,
    pub function: Function,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    #[default]
    Function,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Function {
    pub name: String,
    /// Arguments as the provider's raw JSON string, passed through uninterpreted.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TryFrom<CompletionResponse> for ChatMessage {
    type Error = CompletionError;

    fn try_from(response: CompletionResponse) -> Result<Self, Self::Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("response has no choices".to_string()))?;

        let mut function_calls = Vec::with_capacity(choice.message.tool_calls.len());
        for call in choice.message.tool_calls {
            let arguments = if call.function.arguments.is_empty() {
                None
            } else {
                Some(call.function.arguments)
            };
            function_calls.push(FunctionCall::with_id(
                call.id,
                call.function.name,
                arguments,
            )?);
        }

        Ok(ChatMessage::assistant_with_calls(
            choice.message.content,
            function_calls,
        ))
    }
}

// ================================================================
// Request formatting
// ================================================================

fn to_wire_messages(conversation: &Conversation) -> Vec<Message> {
    let mut wire = Vec::with_capacity(conversation.len());

    for message in conversation.messages() {
        if let Some(result) = &message.function_result {
            // Tool results reference the call id; recover it from the latest
            // assistant call with the same function name, falling back to the
            // name itself.
            let call_id = wire
                .iter()
                .rev()
                .flat_map(|m: &Message| m.tool_calls.iter())
                .find(|call| call.function.name == result.name)
                .map(|call| call.id.clone())
                .unwrap_or_else(|| result.name.clone());

            wire.push(Message {
                role: "tool".to_string(),
                content: Some(result.content.clone()),
                tool_calls: vec![],
                tool_call_id: Some(call_id),
            });
            continue;
        }

        let tool_calls = message
            .function_calls
            .iter()
            .map(|call| ToolCall {
                id: call.id.clone().unwrap_or_else(|| call.name.clone()),
                kind: ToolType::Function,
                function: Function {
                    name: call.name.clone(),
                    arguments: call.arguments.clone().unwrap_or_default(),
                },
            })
            .collect();

        let role = match &message.role {
            Role::Function => "tool".to_string(),
            other => other.as_str().to_string(),
        };

        wire.push(Message {
            role,
            content: message.content.clone(),
            tool_calls,
            tool_call_id: None,
        });
    }

    wire
}

/// Build the `/chat/completions` request body. Pure: identical inputs produce
/// an identical payload.
pub(crate) fn create_request_body(
    conversation: &Conversation,
    options: &ChatCompletionOptions,
    stream: bool,
) -> Result<serde_json::Value, CompletionError> {
    let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if !options.functions.is_empty() && !supports_function_calling(model) {
        return Err(CompletionError::UnsupportedFeature(format!(
            "model {model} does not support function calling"
        )));
    }

    let mut body = json!({
        "model": model,
        "messages": to_wire_messages(conversation),
    });

    if let Some(temperature) = options.temperature {
        json_utils::merge_inplace(&mut body, json!({ "temperature": temperature }));
    }
    if let Some(top_p) = options.top_p {
        json_utils::merge_inplace(&mut body, json!({ "top_p": top_p }));
    }
    if let Some(max_tokens) = options.max_tokens {
        json_utils::merge_inplace(&mut body, json!({ "max_tokens": max_tokens }));
    }
    if let Some(stop) = &options.stop {
        json_utils::merge_inplace(&mut body, json!({ "stop": stop }));
    }
    if let Some(user) = &options.user {
        json_utils::merge_inplace(&mut body, json!({ "user": user }));
    }
    if let Some(format) = &options.response_format {
        let kind = match format {
            ResponseFormat::Text => "text",
            ResponseFormat::JsonObject => "json_object",
        };
        json_utils::merge_inplace(&mut body, json!({ "response_format": { "type": kind } }));
    }
    if !options.functions.is_empty() {
        let tools: Vec<serde_json::Value> = options
            .functions
            .iter()
            .map(|declaration| json!({ "type": "function", "function": declaration }))
            .collect();
        json_utils::merge_inplace(&mut body, json!({ "tools": tools, "tool_choice": "auto" }));
    }
    if stream {
        json_utils::merge_inplace(&mut body, json!({ "stream": true }));
    }
    if let Some(params) = &options.additional_params {
        json_utils::merge_inplace(&mut body, params.clone());
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::FunctionDeclaration;

    fn sample_conversation() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push_system("Be terse.");
        conversation.push_user("What is 2+2?");
        conversation
    }

    #[test]
    fn test_request_body_maps_all_turn_kinds() {
        let mut conversation = sample_conversation();
        conversation.push_assistant(ChatMessage::assistant_with_calls(
            None,
            vec![FunctionCall::with_id(
                "call_1",
                "add",
                Some("{\"a\":2,\"b\":2}".to_string()),
            )
            .unwrap()],
        ));
        conversation.push_function_result("add", "4");

        let body =
            create_request_body(&conversation, &ChatCompletionOptions::new(), false).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "Be terse." },
                    { "role": "user", "content": "What is 2+2?" },
                    {
                        "role": "assistant",
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": { "name": "add", "arguments": "{\"a\":2,\"b\":2}" }
                        }]
                    },
                    { "role": "tool", "content": "4", "tool_call_id": "call_1" },
                ],
            })
        );
    }

    #[test]
    fn test_request_body_is_deterministic() {
        let conversation = sample_conversation();
        let options = ChatCompletionOptions::new()
            .temperature(0.5)
            .max_tokens(64)
            .user("user-7");

        let a = create_request_body(&conversation, &options, true).unwrap();
        let b = create_request_body(&conversation, &options, true).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        assert_eq!(a["stream"], json!(true));
        assert_eq!(a["temperature"], json!(0.5));
    }

    #[test]
    fn test_function_declarations_on_incapable_model_are_rejected() {
        let conversation = sample_conversation();
        let options = ChatCompletionOptions::new()
            .model("gpt-3.5-turbo-instruct")
            .function(FunctionDeclaration {
                name: "add".to_string(),
                description: "Add two numbers".to_string(),
                parameters: json!({"type": "object"}),
            });

        let err = create_request_body(&conversation, &options, false).unwrap_err();
        assert!(matches!(err, CompletionError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_deserialize_completion_response() {
        let raw = r#"{
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": { "name": "add", "arguments": "{\"a\":2,\"b\":2}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }"#;

        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let response: CompletionResponse = serde_path_to_error::deserialize(&mut deserializer)
            .expect("deserialize CompletionResponse");

        let message = ChatMessage::try_from(response).unwrap();
        assert!(message.content.is_none());
        assert_eq!(message.function_calls.len(), 1);
        assert_eq!(message.function_calls[0].id.as_deref(), Some("call_9"));
        assert_eq!(message.function_calls[0].name, "add");
        assert_eq!(
            message.function_calls[0].arguments.as_deref(),
            Some("{\"a\":2,\"b\":2}")
        );
    }

    #[test]
    fn test_response_without_choices_is_malformed() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{ "choices": [], "usage": null }"#).unwrap();
        let err = ChatMessage::try_from(response).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }
}
