//! Tools served by an external MCP server

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use steward_config::McpServerConfig;
use steward_mcp::{McpClient, McpError};

use super::{ToolError, ToolProvider, ToolSpec};

/// Handshake and discovery bound for a freshly started server
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

const CLIENT_NAME: &str = "steward";

/// Adapts one MCP server connection to `ToolProvider`
pub struct McpToolProvider {
    name: String,
    client: McpClient,
}

impl McpToolProvider {
    /// Launch the configured server and complete the handshake
    pub async fn connect(
        name: &str,
        server: &McpServerConfig,
        startup_timeout: Duration,
    ) -> Result<Self, McpError> {
        let client = McpClient::spawn(&server.command, &server.args, &server.env)?;
        let provider = Self::from_client(name, client);

        match tokio::time::timeout(startup_timeout, provider.handshake()).await {
            Ok(Ok(())) => Ok(provider),
            Ok(Err(e)) => {
                provider.client.shutdown().await;
                Err(e)
            }
            Err(_) => {
                provider.client.shutdown().await;
                Err(McpError::Timeout(format!("{} to initialize", name)))
            }
        }
    }

    /// Wrap an already connected client
    pub fn from_client(name: impl Into<String>, client: McpClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    pub async fn handshake(&self) -> Result<(), McpError> {
        let init = self
            .client
            .initialize(CLIENT_NAME, env!("CARGO_PKG_VERSION"))
            .await?;
        info!(
            "mcp server `{}` ready ({} {})",
            self.name, init.server_info.name, init.server_info.version
        );
        Ok(())
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn discover(&self) -> Result<Vec<ToolSpec>, ToolError> {
        let tools = self
            .client
            .list_tools()
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        debug!("mcp server `{}` offers {} tool(s)", self.name, tools.len());
        Ok(tools
            .into_iter()
            .map(|t| ToolSpec::new(t.name, t.description.unwrap_or_default(), t.input_schema))
            .collect())
    }

    async fn invoke(&self, tool: &str, args: Value) -> Result<String, ToolError> {
        let result = self
            .client
            .call_tool(tool, args)
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        let text = result.text();
        if result.is_error {
            return Err(ToolError::Execution(text));
        }
        if text.is_empty() {
            return Ok(json!({ "status": "success", "tool": tool }).to_string());
        }
        Ok(text)
    }

    async fn shutdown(&self) {
        debug!("stopping mcp server `{}`", self.name);
        self.client.shutdown().await;
    }
}
