//! Process-wide runtime context
//!
//! Built once at startup: provider connections, the tool catalog and the
//! agent loop. `shutdown` tears the providers down again.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use steward_config::Config;
use steward_provider::{OpenAiCompatProvider, Provider, ProviderError};

use crate::catalog::{Registration, ToolCatalog};
use crate::channel::{HumanIo, UserChannel};
use crate::loop_agent::{AgentLoop, TurnOutcome};
use crate::tools::{self, mcp, McpToolProvider, ToolProvider, ToolRegistry};
use crate::{AgentError, Result};

/// Everything a session needs, owned in one place
pub struct AgentContext<P: Provider> {
    agent: AgentLoop<P>,
    catalog: Arc<ToolCatalog>,
    channel: UserChannel,
    registrations: Vec<Registration>,
}

impl AgentContext<OpenAiCompatProvider> {
    /// Start with the HTTP model provider selected by the config
    pub async fn bootstrap(config: &Config, io: impl HumanIo + 'static) -> Result<Self> {
        let api_key = config.api_key().ok_or(ProviderError::NoApiKey)?;
        let provider = OpenAiCompatProvider::new(api_key, config.api_base(), config.model());
        Self::with_provider(config, provider, io).await
    }
}

impl<P: Provider> AgentContext<P> {
    pub async fn with_provider(
        config: &Config,
        provider: P,
        io: impl HumanIo + 'static,
    ) -> Result<Self> {
        if !provider.is_configured() {
            return Err(ProviderError::NoApiKey.into());
        }

        let workspace = config.workspace_path();
        tokio::fs::create_dir_all(&workspace).await?;

        let (catalog, registrations) = build_catalog(config, mcp::STARTUP_TIMEOUT).await;
        let catalog = Arc::new(catalog);
        let channel = UserChannel::new(io);
        let agent = AgentLoop::with_config(provider, catalog.clone(), channel.clone(), config);

        Ok(Self {
            agent,
            catalog,
            channel,
            registrations,
        })
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn agent(&self) -> &AgentLoop<P> {
        &self.agent
    }

    pub fn channel(&self) -> &UserChannel {
        &self.channel
    }

    /// Banner listing connected providers and the active tool count
    pub async fn announce(&self) {
        let providers = self.catalog.provider_names();
        let providers = if providers.is_empty() {
            "none".to_string()
        } else {
            providers.join(", ")
        };
        self.channel
            .say(&format!(
                "{} online | model: {} | providers: {} | active tools: {}",
                self.agent.name(),
                self.agent.model().model(),
                providers,
                self.catalog.len() + 1
            ))
            .await;
    }

    /// Process one utterance and present the outcome
    pub async fn process(&mut self, utterance: &str) -> TurnOutcome {
        let outcome = self.agent.process_utterance(utterance).await;
        self.agent.report(&outcome).await;
        outcome
    }

    pub async fn run_session(&mut self) {
        self.agent.run_session().await;
    }

    /// Release provider connections
    pub async fn shutdown(self) {
        self.catalog.shutdown().await;
        info!("providers shut down");
    }
}

/// Built-in tools first, then MCP servers in config order. A provider that
/// cannot be reached is logged and left out.
pub async fn build_catalog(
    config: &Config,
    startup_timeout: Duration,
) -> (ToolCatalog, Vec<Registration>) {
    let mut catalog = ToolCatalog::new();
    let mut registrations = Vec::new();

    if config.tools.builtin {
        let mut registry = ToolRegistry::new();
        tools::register_default_tools(&mut registry, config);
        match catalog.register(Arc::new(registry)).await {
            Ok(report) => registrations.push(report),
            Err(e) => warn!("{}", e),
        }
    }

    for (name, server) in config.enabled_mcp_servers() {
        let provider = match McpToolProvider::connect(name, server, startup_timeout).await {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                warn!(
                    "{}",
                    AgentError::Discovery {
                        provider: name.clone(),
                        reason: e.to_string(),
                    }
                );
                continue;
            }
        };

        let discovery = tokio::time::timeout(startup_timeout, catalog.register(provider.clone()));
        match discovery.await {
            Ok(Ok(report)) => {
                info!(
                    "mcp server `{}`: {} tool(s) registered",
                    name,
                    report.added.len()
                );
                registrations.push(report);
            }
            Ok(Err(e)) => {
                warn!("{}", e);
                provider.shutdown().await;
            }
            Err(_) => {
                warn!("mcp server `{}` timed out listing tools", name);
                provider.shutdown().await;
            }
        }
    }

    (catalog, registrations)
}
