//! Steward command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use steward_agent::runtime::build_catalog;
use steward_agent::tools::mcp::STARTUP_TIMEOUT;
use steward_agent::{catalog::clarification_spec, AgentContext, AgentError, ConsoleIo};
use steward_config::{self, Config};
use steward_provider::ProviderError;

fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(steward_config::config_path)
}

async fn load_config(path: Option<&Path>) -> Result<(PathBuf, Config)> {
    let path = resolve_config_path(path);
    let config = Config::load_from(&path)
        .await
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    Ok((path, config))
}

/// Write the default config and create the workspace
pub async fn init_command(path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(path);

    println!("Initializing steward...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = steward_config::init_at(&path).await?;

    println!("Config:    {}", path.display());
    println!("Workspace: {}", config.workspace_path().display());
    println!("\nNext steps:");
    println!("  1. Add a model API key to {}", path.display());
    println!("     or export GROQ_API_KEY / OPENROUTER_API_KEY / OPENAI_API_KEY");
    println!("  2. Start chatting: steward chat");

    Ok(())
}

/// Interactive session, or a single message with `-m`
pub async fn chat_command(path: Option<&Path>, message: Option<String>) -> Result<()> {
    let (path, config) = load_config(path).await?;

    let mut context = match AgentContext::bootstrap(&config, ConsoleIo::new()).await {
        Ok(context) => context,
        Err(AgentError::Provider(ProviderError::NoApiKey)) => anyhow::bail!(
            "No API key configured. Set one in {} or export GROQ_API_KEY",
            path.display()
        ),
        Err(e) => return Err(e.into()),
    };

    match message {
        Some(message) => {
            debug!("single message mode");
            context.process(&message).await;
        }
        None => {
            context.announce().await;
            context.run_session().await;
        }
    }

    context.shutdown().await;
    Ok(())
}

/// Connect to every configured provider and list what it offers
pub async fn tools_command(path: Option<&Path>) -> Result<()> {
    let (_, config) = load_config(path).await?;
    let (catalog, registrations) = build_catalog(&config, STARTUP_TIMEOUT).await;

    println!("Available tools");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (spec, provider) in catalog.describe() {
        println!("  {:<16} [{}] {}", spec.name, provider, spec.description);
    }
    let ask = clarification_spec();
    println!("  {:<16} [user] {}", ask.name, ask.description);

    for registration in &registrations {
        for name in &registration.duplicates {
            println!(
                "  (skipped {} from {}: name already taken)",
                name, registration.provider
            );
        }
    }

    println!("\n{} tool(s)", catalog.len() + 1);
    catalog.shutdown().await;
    Ok(())
}

/// Show system status
pub async fn status_command(path: Option<&Path>) -> Result<()> {
    let config_path = resolve_config_path(path);

    println!("Steward status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );

    let (_, config) = load_config(Some(&config_path)).await?;
    let workspace = config.workspace_path();
    println!(
        "Workspace: {} {}",
        workspace.display(),
        if workspace.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );
    println!(
        "Model:     {}",
        config
            .model()
            .unwrap_or_else(|| "(endpoint default)".to_string())
    );
    println!(
        "API Key:   {}",
        if config.has_api_key() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    println!(
        "Web search: {}",
        if config.brave_api_key().is_some() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    println!("Max turns: {}", config.agent.max_turns);

    let servers: Vec<_> = config.enabled_mcp_servers().map(|(n, _)| n.as_str()).collect();
    println!(
        "MCP servers: {}",
        if servers.is_empty() {
            "none".to_string()
        } else {
            servers.join(", ")
        }
    );

    Ok(())
}
