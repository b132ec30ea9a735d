//! Steward agent core
//!
//! Tool catalog, concurrent tool dispatch, conversation state and the
//! orchestration loop that drives a tool-calling model.

use thiserror::Error;

pub mod catalog;
pub mod channel;
pub mod context;
pub mod conversation;
pub mod dispatcher;
pub mod loop_agent;
pub mod model;
pub mod runtime;
pub mod tools;

pub use catalog::{Registration, Resolved, ToolCatalog, ToolHandle, CLARIFICATION_TOOL};
pub use channel::{ConsoleIo, HumanIo, UserChannel};
pub use context::ContextBuilder;
pub use conversation::Conversation;
pub use dispatcher::{ToolDispatcher, ToolOutcome, ToolResult};
pub use loop_agent::{AgentLoop, TurnOutcome};
pub use model::{ModelClient, ModelTurn};
pub use runtime::AgentContext;
pub use tools::{ToolError, ToolProvider, ToolRegistry, ToolSpec, ToolTrait};

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("tool provider `{provider}` unavailable: {reason}")]
    Discovery { provider: String, reason: String },

    #[error("model error: {0}")]
    Provider(#[from] steward_provider::ProviderError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
