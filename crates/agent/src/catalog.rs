//! Tool catalog
//!
//! Built once at startup from the registered providers, then shared
//! read-only with every dispatch task.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use steward_provider::Tool;

use crate::tools::{ToolError, ToolProvider, ToolSpec};
use crate::{AgentError, Result};

/// Reserved tool that asks the human instead of a provider
pub const CLARIFICATION_TOOL: &str = "ask_user";

pub fn clarification_spec() -> ToolSpec {
    ToolSpec::new(
        CLARIFICATION_TOOL,
        "Ask the user a clarifying question when the request is vague or \
         missing details. Returns the user's reply.",
        json!({
            "type": "object",
            "properties": {
                "question": { "type": "string", "description": "The question to ask the user" }
            },
            "required": ["question"]
        }),
    )
}

/// Invocation handle for one catalog tool
#[derive(Clone)]
pub struct ToolHandle {
    name: String,
    provider: Arc<dyn ToolProvider>,
}

impl ToolHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn invoke(&self, args: Value) -> std::result::Result<String, ToolError> {
        self.provider.invoke(&self.name, args).await
    }
}

impl std::fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.name)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// What a tool name refers to
#[derive(Debug, Clone)]
pub enum Resolved {
    Provider(ToolHandle),
    Clarification,
    Unresolved,
}

/// Outcome of registering one provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub provider: String,
    pub added: Vec<String>,
    /// Names dropped because an earlier registration already owns them
    pub duplicates: Vec<String>,
}

struct Entry {
    spec: ToolSpec,
    provider: Arc<dyn ToolProvider>,
}

/// Every invokable tool, in registration order
#[derive(Default)]
pub struct ToolCatalog {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    providers: Vec<Arc<dyn ToolProvider>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover a provider's tools and merge them in. First registration of
    /// a name wins; the reserved clarification name is never taken.
    pub async fn register(&mut self, provider: Arc<dyn ToolProvider>) -> Result<Registration> {
        let label = provider.name().to_string();
        let specs = provider
            .discover()
            .await
            .map_err(|e| AgentError::Discovery {
                provider: label.clone(),
                reason: e.to_string(),
            })?;

        let mut report = Registration {
            provider: label.clone(),
            ..Default::default()
        };

        for spec in specs {
            if spec.name == CLARIFICATION_TOOL || self.index.contains_key(&spec.name) {
                warn!(
                    "duplicate tool `{}` from provider `{}` dropped",
                    spec.name, label
                );
                report.duplicates.push(spec.name);
                continue;
            }

            debug!("registered tool `{}` from `{}`", spec.name, label);
            self.index.insert(spec.name.clone(), self.entries.len());
            report.added.push(spec.name.clone());
            self.entries.push(Entry {
                spec,
                provider: provider.clone(),
            });
        }

        self.providers.push(provider);
        Ok(report)
    }

    /// Tool definitions for the model, clarification last
    pub fn list_for_presentation(&self) -> Vec<Tool> {
        self.entries
            .iter()
            .map(|e| e.spec.to_provider_tool())
            .chain(std::iter::once(clarification_spec().to_provider_tool()))
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Resolved {
        if name == CLARIFICATION_TOOL {
            return Resolved::Clarification;
        }
        match self.index.get(name) {
            Some(&i) => {
                let entry = &self.entries[i];
                Resolved::Provider(ToolHandle {
                    name: entry.spec.name.clone(),
                    provider: entry.provider.clone(),
                })
            }
            None => Resolved::Unresolved,
        }
    }

    /// Specs with the owning provider's name, for listings
    pub fn describe(&self) -> Vec<(&ToolSpec, &str)> {
        self.entries
            .iter()
            .map(|e| (&e.spec, e.provider.name()))
            .collect()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Number of provider tools, not counting the clarification tool
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release every registered provider
    pub async fn shutdown(&self) {
        for provider in &self.providers {
            provider.shutdown().await;
        }
    }
}
