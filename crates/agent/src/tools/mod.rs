//! Tool providers
//!
//! A `ToolProvider` exposes a set of named tools and invokes them by name.
//! In-process tools implement `ToolTrait` and are grouped in a
//! `ToolRegistry`; external MCP servers are adapted by `McpToolProvider`.

pub mod filesystem;
pub mod mcp;
pub mod path_utils;
pub mod web;

pub use filesystem::{ListFilesTool, ReadFileTool, WriteFileTool};
pub use mcp::McpToolProvider;
pub use web::WebSearchTool;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use steward_config::Config;
use steward_provider::Tool;

/// Failure of a single tool invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Execution(String),

    #[error("provider unavailable: {0}")]
    Transport(String),

    #[error("Tool {0} not found")]
    NotFound(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::InvalidArguments(e.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::Execution(e.to_string())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::Transport(e.to_string())
    }
}

/// Name, description and JSON schema of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    pub fn to_provider_tool(&self) -> Tool {
        Tool::new(&self.name, &self.description, self.parameters.clone())
    }
}

/// Source of invokable tools
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Label used in logs and the startup banner
    fn name(&self) -> &str;

    async fn discover(&self) -> Result<Vec<ToolSpec>, ToolError>;

    async fn invoke(&self, tool: &str, args: Value) -> Result<String, ToolError>;

    /// Release connections held by the provider
    async fn shutdown(&self) {}
}

/// In-process tool
#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}

pub fn to_tool_spec(tool: &dyn ToolTrait) -> ToolSpec {
    ToolSpec::new(tool.name(), tool.description(), tool.parameters())
}

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

/// Provider for the tools that ship with steward
pub struct ToolRegistry {
    label: String,
    tools: HashMap<String, BoxedTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::with_label("builtin")
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Box::new(tool)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Specs in registration order
    pub fn definitions(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| to_tool_spec(t.as_ref()))
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(args).await
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProvider for ToolRegistry {
    fn name(&self) -> &str {
        &self.label
    }

    async fn discover(&self) -> Result<Vec<ToolSpec>, ToolError> {
        Ok(self.definitions())
    }

    async fn invoke(&self, tool: &str, args: Value) -> Result<String, ToolError> {
        self.execute(tool, args).await
    }
}

/// Register the built-in workspace and web tools
pub fn register_default_tools(registry: &mut ToolRegistry, config: &Config) {
    let workspace = config.workspace_path();

    registry.register(ListFilesTool::new(workspace.clone()));
    registry.register(ReadFileTool::new(workspace.clone()));
    registry.register(WriteFileTool::new(workspace));

    registry.register(WebSearchTool::from_config(config));
}
