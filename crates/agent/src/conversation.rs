//! Append-only conversation log

use steward_provider::{Message, Role};

use crate::dispatcher::ToolResult;
use crate::model::ModelTurn;

/// System prompt plus every message of the session, oldest first.
///
/// Owned and mutated only by the orchestration loop. Nothing is ever
/// removed, so ids echoed in tool messages always find their request.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_prompt: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Record a model turn, carrying its tool calls verbatim
    pub fn append_assistant(&mut self, turn: &ModelTurn) {
        let message = if turn.has_tool_calls() {
            Message::assistant_tool_calls(turn.text.clone(), &turn.tool_calls)
        } else {
            Message::assistant(turn.text.clone().unwrap_or_default())
        };
        self.messages.push(message);
    }

    /// One tool message per result, in the order given
    pub fn append_tool_results(&mut self, results: &[ToolResult]) {
        self.messages.extend(
            results
                .iter()
                .map(|r| Message::tool(&r.call_id, &r.name, r.content_for_model())),
        );
    }

    /// Messages for the next model call, system prompt first
    pub fn snapshot(&self) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        out.push(Message::system(&self.system_prompt));
        out.extend(self.messages.iter().cloned());
        out
    }

    /// Count of messages by role
    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
