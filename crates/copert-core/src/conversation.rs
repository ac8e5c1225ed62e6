//! Conversation state owned by one orchestrator run
//!
//! Append-only: the only non-append mutation is placing the system message
//! at the front on first use.

use copert_llm::{Message, MessageRole, ToolCall};
use std::collections::HashSet;

/// Ordered message history of one conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `prompt` first unless a system message is already there
    pub fn ensure_system(&mut self, prompt: &str) {
        let has_system = self
            .messages
            .first()
            .is_some_and(|m| m.role == MessageRole::System);
        if !has_system {
            self.messages.insert(0, Message::system(prompt));
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been said yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the most recent assistant message that has any
    #[must_use]
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Assistant)
            .find_map(Message::text)
    }

    /// Calls of the last assistant message that no tool message has answered yet
    #[must_use]
    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        let Some(position) = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::Assistant)
        else {
            return Vec::new();
        };

        let answered: HashSet<&str> = self.messages[position + 1..]
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        self.messages[position]
            .tool_calls
            .iter()
            .filter(|call| !answered.contains(call.id.as_str()))
            .cloned()
            .collect()
    }
}
