//! Model Context Protocol client
//!
//! Talks newline-delimited JSON-RPC 2.0 to a tool server, either a child
//! process over its stdin/stdout or any pair of async byte streams.

use thiserror::Error;

pub mod client;
pub mod protocol;

pub use client::McpClient;
pub use protocol::{
    CallToolResult, ContentItem, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    McpTool, ServerInfo, ToolsListResult, PROTOCOL_VERSION,
};

/// Tool server errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("connection closed")]
    Closed,

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, McpError>;
