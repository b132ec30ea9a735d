//! Orchestration loop
//!
//! Drives model and tool rounds for one utterance at a time against the
//! session's conversation, within a per-utterance turn budget.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use steward_config::{AgentConfig, Config};
use steward_provider::Provider;

use crate::catalog::ToolCatalog;
use crate::channel::UserChannel;
use crate::context::ContextBuilder;
use crate::conversation::Conversation;
use crate::dispatcher::ToolDispatcher;
use crate::model::ModelClient;

/// How processing of one utterance ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Final answer text, possibly empty
    Answered(String),
    /// The model was still calling tools after this many turns
    BudgetExceeded { turns: u32 },
    /// The model call failed; the utterance was abandoned
    ModelFailure(String),
}

/// The agent loop
pub struct AgentLoop<P: Provider> {
    model: ModelClient<P>,
    dispatcher: ToolDispatcher,
    conversation: Conversation,
    channel: UserChannel,
    settings: AgentConfig,
}

impl<P: Provider> AgentLoop<P> {
    pub fn new(
        model: ModelClient<P>,
        dispatcher: ToolDispatcher,
        conversation: Conversation,
        channel: UserChannel,
        settings: AgentConfig,
    ) -> Self {
        Self {
            model,
            dispatcher,
            conversation,
            channel,
            settings,
        }
    }

    /// Wire up a loop from config; the system prompt is fixed here
    pub fn with_config(
        provider: P,
        catalog: Arc<ToolCatalog>,
        channel: UserChannel,
        config: &Config,
    ) -> Self {
        let settings = config.agent.clone();
        let system_prompt = ContextBuilder::new(&settings.name, config.workspace_path())
            .with_protocol(settings.system_prompt.clone())
            .build_system_prompt();

        let model = ModelClient::with_config(provider, &settings);
        let dispatcher =
            ToolDispatcher::new(catalog, channel.clone()).with_activity(settings.show_tool_activity);

        Self::new(
            model,
            dispatcher,
            Conversation::new(system_prompt),
            channel,
            settings,
        )
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model(&self) -> &ModelClient<P> {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn max_turns(&self) -> u32 {
        self.settings.turn_budget()
    }

    /// Run model and tool rounds until an answer, a model failure, or the
    /// turn budget is spent. Whatever was appended stays in the conversation.
    pub async fn process_utterance(&mut self, text: &str) -> TurnOutcome {
        self.conversation.append_user(text);
        let max_turns = self.settings.turn_budget();

        for turn in 1..=max_turns {
            debug!("turn {}/{}", turn, max_turns);

            let reply = match self
                .model
                .complete(&self.conversation, self.dispatcher.catalog())
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    error!("model call failed: {}", e);
                    return TurnOutcome::ModelFailure(e.to_string());
                }
            };

            self.conversation.append_assistant(&reply);
            if !reply.has_tool_calls() {
                return TurnOutcome::Answered(reply.answer().unwrap_or_default().to_string());
            }

            if self.settings.show_tool_activity {
                self.channel
                    .say(&format!(
                        "[step {}] running {} tool call(s)",
                        turn,
                        reply.tool_calls.len()
                    ))
                    .await;
            }

            let results = self.dispatcher.dispatch(&reply.tool_calls).await;
            self.conversation.append_tool_results(&results);
        }

        warn!("step limit of {} turns reached", max_turns);
        TurnOutcome::BudgetExceeded { turns: max_turns }
    }

    /// Read utterances until an exit phrase or end of input
    pub async fn run_session(&mut self) {
        info!("session started");

        loop {
            let Some(line) = self.channel.prompt("You: ").await else {
                debug!("end of input");
                break;
            };
            let utterance = line.trim();
            if utterance.is_empty() {
                continue;
            }
            if self.settings.is_exit_phrase(utterance) {
                break;
            }

            let outcome = self.process_utterance(utterance).await;
            self.report(&outcome).await;
        }

        self.channel.say("Goodbye.").await;
        info!(
            "session ended after {} message(s)",
            self.conversation.len()
        );
    }

    /// Present an outcome to the user
    pub async fn report(&self, outcome: &TurnOutcome) {
        let text = match outcome {
            TurnOutcome::Answered(answer) if answer.is_empty() => {
                format!("{}: (no content in the reply)", self.settings.name)
            }
            TurnOutcome::Answered(answer) => format!("{}: {}", self.settings.name, answer),
            TurnOutcome::BudgetExceeded { turns } => format!(
                "Step limit reached ({} turns) without a final answer.",
                turns
            ),
            TurnOutcome::ModelFailure(reason) => format!("Model call failed: {}", reason),
        };
        self.channel.say(&text).await;
    }
}
