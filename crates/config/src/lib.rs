//! Configuration management for steward
//!
//! Loads and saves the agent settings, model provider keys and the
//! MCP tool server table from a JSON file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir, workspace_path};

/// Well-known endpoint of the Groq OpenAI-compatible API
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
/// Well-known endpoint of OpenRouter
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
/// Well-known endpoint of OpenAI
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Errors in configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Credentials for one model provider
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// All supported model providers, in key lookup order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub groq: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

/// Agent behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_workspace")]
    pub workspace: String,
    /// Model id; empty means the endpoint's own default
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_exit_phrases")]
    pub exit_phrases: Vec<String>,
    #[serde(default = "default_true")]
    pub show_tool_activity: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            workspace: default_workspace(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_turns: default_max_turns(),
            exit_phrases: default_exit_phrases(),
            show_tool_activity: true,
            system_prompt: None,
        }
    }
}

impl AgentConfig {
    /// Model turns allowed per utterance; at least one
    pub fn turn_budget(&self) -> u32 {
        self.max_turns.max(1)
    }

    /// Whether an utterance is one of the exit phrases, ignoring case
    pub fn is_exit_phrase(&self, input: &str) -> bool {
        let input = input.trim();
        self.exit_phrases
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(input))
    }
}

fn default_name() -> String {
    "Steward".to_string()
}

fn default_workspace() -> String {
    "~/.steward/workspace".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_turns() -> u32 {
    20
}

fn default_exit_phrases() -> Vec<String> {
    vec!["exit".to_string(), "quit".to_string()]
}

fn default_true() -> bool {
    true
}

/// Web search tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    5
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_results: default_max_results(),
        }
    }
}

/// Web tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebToolsConfig {
    #[serde(default)]
    pub search: WebSearchConfig,
}

/// Built-in tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub builtin: bool,
    #[serde(default)]
    pub web: WebToolsConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            web: WebToolsConfig::default(),
        }
    }
}

/// One MCP tool server launched over stdio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: BTreeMap::new(),
            enabled: true,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: IndexMap<String, McpServerConfig>,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Workspace path with `~` expanded
    pub fn workspace_path(&self) -> PathBuf {
        let path = &self.agent.workspace;
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        } else if path == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
        PathBuf::from(path)
    }

    /// First configured provider key, then the provider environment variables
    pub fn api_key(&self) -> Option<String> {
        self.configured_provider()
            .map(|(_, p)| p.api_key.clone())
            .or_else(|| {
                Self::env_keys()
                    .iter()
                    .find_map(|(var, _)| std::env::var(var).ok().filter(|k| !k.is_empty()))
            })
    }

    /// Endpoint matching the provider that supplied the key
    pub fn api_base(&self) -> Option<String> {
        if let Some((base, provider)) = self.configured_provider() {
            return provider
                .api_base
                .clone()
                .filter(|b| !b.is_empty())
                .or_else(|| Some(base.to_string()));
        }

        Self::env_keys().iter().find_map(|(var, base)| {
            std::env::var(var)
                .ok()
                .filter(|k| !k.is_empty())
                .map(|_| base.to_string())
        })
    }

    fn configured_provider(&self) -> Option<(&'static str, &ProviderConfig)> {
        [
            (GROQ_API_BASE, &self.providers.groq),
            (OPENROUTER_API_BASE, &self.providers.openrouter),
            (OPENAI_API_BASE, &self.providers.openai),
        ]
        .into_iter()
        .find(|(_, p)| !p.api_key.is_empty())
    }

    fn env_keys() -> [(&'static str, &'static str); 3] {
        [
            ("GROQ_API_KEY", GROQ_API_BASE),
            ("OPENROUTER_API_KEY", OPENROUTER_API_BASE),
            ("OPENAI_API_KEY", OPENAI_API_BASE),
        ]
    }

    /// Verify a model key is available
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Configured model, `None` when the endpoint default applies
    pub fn model(&self) -> Option<String> {
        let model = self.agent.model.trim();
        if model.is_empty() {
            None
        } else {
            Some(model.to_string())
        }
    }

    /// Get web search API key
    pub fn brave_api_key(&self) -> Option<String> {
        let key = &self.tools.web.search.api_key;
        if key.is_empty() {
            None
        } else {
            Some(key.clone())
        }
    }

    /// Get web search max results
    pub fn web_search_max_results(&self) -> u32 {
        self.tools.web.search.max_results
    }

    /// MCP servers that should be started, in the order the file lists them
    pub fn enabled_mcp_servers(&self) -> impl Iterator<Item = (&String, &McpServerConfig)> {
        self.mcp_servers.iter().filter(|(_, s)| s.enabled)
    }

    /// Whether an utterance is one of the configured exit phrases
    pub fn is_exit_phrase(&self, input: &str) -> bool {
        self.agent.is_exit_phrase(input)
    }
}

/// Write the default config and create the workspace
pub async fn init_at(path: &Path) -> Result<Config> {
    if path.exists() {
        warn!("config already present at {:?}", path);
    } else {
        let config = Config::default();
        config.save_to(path).await?;
        info!("config written to {:?}", path);
    }

    let config = Config::load_from(path).await?;
    let workspace = config.workspace_path();
    tokio::fs::create_dir_all(&workspace).await?;
    info!("workspace ready at {:?}", workspace);

    Ok(config)
}

/// Initialize config and workspace at the default location
pub async fn init() -> Result<Config> {
    init_at(&config_path()).await
}
