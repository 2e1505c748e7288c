//! Provider-agnostic message types.
//!
//! A [Message] represents a single conversation turn. Each provider is
//! responsible for converting the generic message into its provider-specific
//! wire type using `From`/`TryFrom` style conversions inside the provider
//! module. Since not every provider supports every feature, the conversion can
//! be lossy, though the semantic content of a turn is always preserved.

use serde::{Deserialize, Serialize};

use crate::completion::CompletionError;

/// The role of a conversation turn.
///
/// The `Other` variant exists for provider-specific roles; an empty `Other`
/// role is rejected when the message is appended to a
/// [Conversation](crate::conversation::Conversation).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
            Role::Other(role) => role,
        }
    }

    /// Whether this role names anything at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Role::Other(role) if role.is_empty())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function/tool call proposed by the model.
///
/// `arguments` is kept in the provider's raw encoding (typically a serialized
/// JSON object); callers decode it when they actually invoke the function.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// Call identifier, for providers that correlate calls by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl FunctionCall {
    /// Create a function call for providers without call identifiers.
    ///
    /// Fails with [CompletionError::InvalidArgument] if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        arguments: Option<String>,
    ) -> Result<Self, CompletionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CompletionError::InvalidArgument(
                "function call name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: None,
            name,
            arguments,
        })
    }

    /// Create a function call with a provider-assigned call identifier.
    ///
    /// Fails with [CompletionError::InvalidArgument] if `name` is empty.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Option<String>,
    ) -> Result<Self, CompletionError> {
        let mut call = Self::new(name, arguments)?;
        call.id = Some(id.into());
        Ok(call)
    }
}

/// The outcome of a function call, reported back to the model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FunctionResult {
    pub name: String,
    pub content: String,
}

/// A single conversation turn.
///
/// A turn may carry text content, function calls (assistant turns proposing
/// calls), a function result (turns reporting a call's outcome), or a
/// combination. The chronological ordering of turns is semantically meaningful
/// and is never reordered by this library.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionResult>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            function_calls: vec![],
            function_result: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            function_calls: vec![],
            function_result: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            function_calls: vec![],
            function_result: None,
        }
    }

    /// An assistant turn carrying text and/or function calls, as produced by
    /// a finalized completion.
    pub fn assistant_with_calls(
        content: Option<String>,
        function_calls: Vec<FunctionCall>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content,
            function_calls,
            function_result: None,
        }
    }

    /// A turn reporting a function call's outcome back to the model.
    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: None,
            function_calls: vec![],
            function_result: Some(FunctionResult {
                name: name.into(),
                content: content.into(),
            }),
        }
    }

    /// The number of characters this turn contributes to a conversation's
    /// character budget: text content plus function call names/arguments plus
    /// function result content.
    pub(crate) fn char_cost(&self) -> usize {
        let content = self.content.as_deref().map_or(0, str::len);
        let calls: usize = self
            .function_calls
            .iter()
            .map(|call| call.name.len() + call.arguments.as_deref().map_or(0, str::len))
            .sum();
        let result = self
            .function_result
            .as_ref()
            .map_or(0, |r| r.name.len() + r.content.len());
        content + calls + result
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::user(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::user(text)
    }
}
