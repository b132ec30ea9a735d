//! Concurrent tool dispatch
//!
//! Every call in a batch runs on its own task. Results come back in
//! request order, one per request, whatever order the tasks finish in.

use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use steward_provider::ToolCall;

use crate::catalog::{Resolved, ToolCatalog};
use crate::channel::UserChannel;

pub const DEFAULT_QUESTION: &str = "I need some clarification.";

const ARGS_PREVIEW: usize = 80;
const REASON_PREVIEW: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

/// Result of one tool call, tied to the request by id
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(call: &ToolCall, payload: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            outcome: ToolOutcome::Success(payload.into()),
        }
    }

    pub fn failure(call: &ToolCall, reason: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            outcome: ToolOutcome::Failure(reason.into()),
        }
    }

    pub fn not_found(call: &ToolCall) -> Self {
        Self::failure(call, format!("Tool {} not found", call.name))
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    /// Tool message body; failures are wrapped as `{"error": ...}`
    pub fn content_for_model(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(payload) => payload.clone(),
            ToolOutcome::Failure(reason) => json!({ "error": reason }).to_string(),
        }
    }
}

/// Fans a batch of tool calls out over the catalog
#[derive(Clone)]
pub struct ToolDispatcher {
    catalog: Arc<ToolCatalog>,
    channel: UserChannel,
    show_activity: bool,
}

impl ToolDispatcher {
    pub fn new(catalog: Arc<ToolCatalog>, channel: UserChannel) -> Self {
        Self {
            catalog,
            channel,
            show_activity: true,
        }
    }

    pub fn with_activity(mut self, show: bool) -> Self {
        self.show_activity = show;
        self
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    /// Run every call concurrently and return their results in input order
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        debug!("dispatching {} tool call(s)", calls.len());

        let tasks: Vec<_> = calls
            .iter()
            .map(|call| {
                let resolved = self.catalog.resolve(&call.name);
                let activity = Activity {
                    channel: self.channel.clone(),
                    enabled: self.show_activity,
                };
                let call = call.clone();
                tokio::spawn(async move { run_call(call, resolved, activity).await })
            })
            .collect();

        join_all(tasks)
            .await
            .into_iter()
            .zip(calls)
            .map(|(joined, call)| match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!("tool task for `{}` aborted: {}", call.name, e);
                    ToolResult::failure(call, format!("Error executing {}: {}", call.name, e))
                }
            })
            .collect()
    }
}

async fn run_call(call: ToolCall, resolved: Resolved, activity: Activity) -> ToolResult {
    let args = call.parsed_arguments();
    activity.start(&call.name, &call.arguments).await;

    let result = match resolved {
        Resolved::Unresolved => {
            warn!("model requested unknown tool `{}`", call.name);
            ToolResult::not_found(&call)
        }
        Resolved::Clarification => {
            let question = clarification_question(&args);
            match activity.channel.ask(&question).await {
                Some(reply) => ToolResult::success(&call, reply),
                None => ToolResult::failure(&call, "no reply from user"),
            }
        }
        Resolved::Provider(handle) => match handle.invoke(args).await {
            Ok(payload) => ToolResult::success(&call, payload),
            Err(e) => {
                warn!(
                    "tool `{}` from `{}` failed: {}",
                    call.name,
                    handle.provider_name(),
                    e
                );
                ToolResult::failure(&call, format!("Error executing {}: {}", call.name, e))
            }
        },
    };

    match &result.outcome {
        ToolOutcome::Success(_) => activity.done(&call.name).await,
        ToolOutcome::Failure(reason) => activity.fail(&call.name, reason).await,
    }
    result
}

fn clarification_question(args: &Value) -> String {
    args.get("question")
        .and_then(|q| q.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_QUESTION)
        .to_string()
}

/// Progress lines shown while tools run
struct Activity {
    channel: UserChannel,
    enabled: bool,
}

impl Activity {
    async fn start(&self, name: &str, args: &str) {
        if self.enabled {
            self.channel
                .say(&format!("  [start] {} -> {}", name, abbreviate(args, ARGS_PREVIEW)))
                .await;
        }
    }

    async fn done(&self, name: &str) {
        if self.enabled {
            self.channel.say(&format!("  [done] {}", name)).await;
        }
    }

    async fn fail(&self, name: &str, reason: &str) {
        if self.enabled {
            self.channel
                .say(&format!(
                    "  [fail] {}: {}",
                    name,
                    abbreviate(reason, REASON_PREVIEW)
                ))
                .await;
        }
    }
}

/// Cut `text` to `max` characters, marking the cut
pub fn abbreviate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut)
}
