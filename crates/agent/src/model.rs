//! Model client

use tracing::debug;

use steward_config::AgentConfig;
use steward_provider::{ChatParams, ChatResponse, Provider, ToolCall, ToolChoice};

use crate::catalog::ToolCatalog;
use crate::conversation::Conversation;

/// One model reply: free text, tool calls, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: Option<String>,
    /// In the order the model emitted them
    pub tool_calls: Vec<ToolCall>,
}

impl ModelTurn {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text with surrounding whitespace removed, if any is left
    pub fn answer(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl From<ChatResponse> for ModelTurn {
    fn from(response: ChatResponse) -> Self {
        Self {
            text: response.content,
            tool_calls: response.tool_calls,
        }
    }
}

/// Single request/response call to a completion model
pub struct ModelClient<P: Provider> {
    provider: P,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl<P: Provider> ModelClient<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.6,
        }
    }

    /// Model and sampling settings from the agent config
    pub fn with_config(provider: P, config: &AgentConfig) -> Self {
        let model = match config.model.trim() {
            "" => provider.default_model(),
            model => model.to_string(),
        };
        Self {
            provider,
            model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn complete(
        &self,
        conversation: &Conversation,
        catalog: &ToolCatalog,
    ) -> steward_provider::Result<ModelTurn> {
        let params = ChatParams {
            model: self.model.clone(),
            messages: conversation.snapshot(),
            tools: catalog.list_for_presentation(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tool_choice: ToolChoice::Auto,
        };

        debug!(
            "model call: {} messages, {} tools",
            params.messages.len(),
            params.tools.len()
        );
        let response = self.provider.chat(params).await?;
        debug!(
            "model replied: finish={} tool_calls={}",
            response.finish_reason,
            response.tool_calls.len()
        );
        Ok(response.into())
    }
}
