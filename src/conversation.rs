//! An ordered, append-only collection of conversation turns.
//!
//! A [Conversation] is owned by the caller for its lifetime; the library
//! mutates it only by appending. During a single completion call the
//! conversation is append-only, and a single conversation instance must not be
//! mutated by two in-flight completions (single-writer discipline — use
//! separate conversations or external synchronization for concurrent calls).

use serde::{Deserialize, Serialize};

use crate::completion::CompletionError;
use crate::message::{Message, Role};

/// Budget for an explicit [Conversation::trim] call.
///
/// Both limits may be set; the stricter one wins. System turns are never
/// dropped and do not stop older non-system turns from being dropped.
#[derive(Clone, Debug, Default)]
pub struct TrimBudget {
    /// Maximum number of turns to keep, system turns included.
    pub max_turns: Option<usize>,
    /// Maximum total characters to keep (text content, function call
    /// names/arguments, function result content).
    pub max_chars: Option<usize>,
}

/// An ordered sequence of [Message] turns.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with a single user turn.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push_user(prompt);
        conversation
    }

    /// Append a message, validating its role.
    ///
    /// Fails with [CompletionError::InvalidArgument] if the message's role is
    /// empty; the conversation is unchanged on failure.
    pub fn push(&mut self, message: Message) -> Result<(), CompletionError> {
        if message.role.is_empty() {
            return Err(CompletionError::InvalidArgument(
                "message role must not be empty".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.messages.push(Message::system(content));
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant turn. The message's role is forced to
    /// [Role::Assistant], so an empty or foreign role can never enter the
    /// conversation through this path.
    pub fn push_assistant(&mut self, mut message: Message) {
        message.role = Role::Assistant;
        self.messages.push(message);
    }

    pub fn push_function_result(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.messages.push(Message::function_result(name, content));
    }

    /// An order-preserving view of all turns.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Explicitly trim the conversation to the given budget, dropping the
    /// oldest non-system turns first. System turns are never dropped. Returns
    /// the number of turns removed.
    ///
    /// The library never trims implicitly; callers decide when and how much.
    pub fn trim(&mut self, budget: &TrimBudget) -> usize {
        let before = self.messages.len();

        if let Some(max_turns) = budget.max_turns {
            while self.messages.len() > max_turns && self.drop_oldest_non_system() {}
        }

        if let Some(max_chars) = budget.max_chars {
            while self.char_count() > max_chars && self.drop_oldest_non_system() {}
        }

        before - self.messages.len()
    }

    fn char_count(&self) -> usize {
        self.messages.iter().map(Message::char_cost).sum()
    }

    fn drop_oldest_non_system(&mut self) -> bool {
        match self.messages.iter().position(|m| m.role != Role::System) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }
}

impl IntoIterator for Conversation {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FunctionCall;

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new();
        conversation.push_system("be terse");
        conversation.push_user("2+2?");
        conversation.push_assistant(Message::assistant("4"));
        conversation.push_function_result("add", "4");

        let roles: Vec<Role> = conversation.iter().map(|m| m.role.clone()).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Function]
        );
    }

    #[test]
    fn test_push_rejects_empty_role() {
        let mut conversation = Conversation::from_prompt("hi");
        let message = Message {
            role: Role::Other(String::new()),
            content: Some("anything".to_string()),
            function_calls: vec![],
            function_result: None,
        };

        let err = conversation.push(message).unwrap_err();
        assert!(matches!(err, CompletionError::InvalidArgument(_)));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_push_assistant_forces_assistant_role() {
        let mut conversation = Conversation::from_prompt("hi");
        let message = Message {
            role: Role::Other(String::new()),
            content: Some("4".to_string()),
            function_calls: vec![],
            function_result: None,
        };

        conversation.push_assistant(message);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[1].role, Role::Assistant);
        assert!(!conversation.messages()[1].role.is_empty());
    }

    #[test]
    fn test_trim_by_turns_keeps_system() {
        let mut conversation = Conversation::new();
        conversation.push_system("be terse");
        for i in 0..5 {
            conversation.push_user(format!("question {i}"));
        }

        let dropped = conversation.trim(&TrimBudget {
            max_turns: Some(3),
            max_chars: None,
        });

        assert_eq!(dropped, 3);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[0].role, Role::System);
        // Oldest non-system turns were dropped first.
        assert_eq!(
            conversation.messages()[1].content.as_deref(),
            Some("question 3")
        );
        assert_eq!(
            conversation.messages()[2].content.as_deref(),
            Some("question 4")
        );
    }

    #[test]
    fn test_trim_by_chars() {
        let mut conversation = Conversation::new();
        conversation.push_system("sys"); // 3 chars, never dropped
        conversation.push_user("aaaaaaaaaa"); // 10 chars
        conversation.push_user("bbbbb"); // 5 chars

        conversation.trim(&TrimBudget {
            max_turns: None,
            max_chars: Some(9),
        });

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[1].content.as_deref(), Some("bbbbb"));
    }

    #[test]
    fn test_trim_never_drops_system_even_over_budget() {
        let mut conversation = Conversation::new();
        conversation.push_system("a very long system prompt that exceeds the budget");
        conversation.push_user("hi");

        conversation.trim(&TrimBudget {
            max_turns: Some(0),
            max_chars: Some(1),
        });

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::System);
    }

    #[test]
    fn test_char_budget_counts_function_payloads() {
        let mut conversation = Conversation::new();
        let mut message = Message::assistant_with_calls(
            None,
            vec![FunctionCall::new("lookup", Some("{}".to_string())).unwrap()],
        );
        message.content = Some("x".to_string());
        conversation.push_assistant(message);
        conversation.push_user("yy");

        // lookup(6) + {}(2) + x(1) = 9 for the first turn, 2 for the second.
        conversation.trim(&TrimBudget {
            max_turns: None,
            max_chars: Some(8),
        });

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].content.as_deref(), Some("yy"));
    }
}
