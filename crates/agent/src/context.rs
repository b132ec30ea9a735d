//! System prompt assembly

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::catalog::CLARIFICATION_TOOL;

/// Builds the system prompt that opens every conversation
pub struct ContextBuilder {
    name: String,
    workspace: PathBuf,
    protocol: Option<String>,
}

impl ContextBuilder {
    pub fn new(name: impl Into<String>, workspace: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            workspace: workspace.as_ref().to_path_buf(),
            protocol: None,
        }
    }

    /// Replace the default operating protocol
    pub fn with_protocol(mut self, protocol: Option<String>) -> Self {
        self.protocol = protocol.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn build_system_prompt(&self) -> String {
        self.build_system_prompt_at(Local::now())
    }

    pub fn build_system_prompt_at(&self, now: DateTime<Local>) -> String {
        let protocol = self
            .protocol
            .clone()
            .unwrap_or_else(|| self.default_protocol());

        format!(
            "You are {}, an advanced AI assistant.\n\
             Current date and time: {}\n\
             Workspace: {}\n\n\
             {}",
            self.name,
            now.format("%Y-%m-%d %H:%M"),
            self.workspace.display(),
            protocol
        )
    }

    fn default_protocol(&self) -> String {
        format!(
            r#"## Operating protocol

1. CLARIFY FIRST: if a request is vague (for example "make a file" or "look this up"), do not guess. Call `{ask}` to ask for the missing details (file name, topic, context).
2. THINK: reason step by step about what the user actually needs.
3. ACT: use the available tools. Independent tool calls may be issued together in one turn.
4. VERIFY: check tool results before answering. If a tool reports an error, explain it or try another way.
5. ANSWER: reply concisely and never invent information you did not obtain from a tool or the user.

When you call `{ask}`, wait for the reply instead of continuing to guess."#,
            ask = CLARIFICATION_TOOL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_default_prompt_contents() {
        let builder = ContextBuilder::new("Steward", "/tmp/ws");
        let prompt = builder.build_system_prompt_at(fixed_now());

        assert!(prompt.starts_with("You are Steward"));
        assert!(prompt.contains("Current date and time: 2025-03-14 09:26"));
        assert!(prompt.contains("Workspace: /tmp/ws"));
        assert!(prompt.contains("`ask_user`"));
    }

    #[test]
    fn test_custom_protocol_keeps_date() {
        let builder = ContextBuilder::new("Steward", "/tmp/ws")
            .with_protocol(Some("Answer in French.".to_string()));
        let prompt = builder.build_system_prompt_at(fixed_now());

        assert!(prompt.ends_with("Answer in French."));
        assert!(prompt.contains("2025-03-14 09:26"));
        assert!(!prompt.contains("Operating protocol"));
    }

    #[test]
    fn test_blank_custom_protocol_is_ignored() {
        let builder =
            ContextBuilder::new("Steward", "/tmp/ws").with_protocol(Some("   ".to_string()));
        assert!(builder.build_system_prompt().contains("Operating protocol"));
    }
}
