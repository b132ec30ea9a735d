//! Shared fakes for agent integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use steward_agent::{HumanIo, ToolError, ToolProvider, ToolSpec};
use steward_provider::{ChatParams, ChatResponse, Provider, ProviderError, ToolCall};

/// Terminal stand-in: replays scripted input lines and records everything
/// shown, with replies logged as `in: ...` in the same sequence.
#[derive(Clone, Default)]
pub struct ScriptedIo {
    inputs: Arc<Mutex<VecDeque<String>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedIo {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: Arc::new(Mutex::new(inputs.iter().map(|s| s.to_string()).collect())),
            log: Arc::default(),
        }
    }

    /// Every line shown and read, in order
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Only the lines shown to the user
    pub fn shown(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|l| l.strip_prefix("out: ").map(str::to_string))
            .collect()
    }

    pub fn remaining_input(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait]
impl HumanIo for ScriptedIo {
    async fn present(&mut self, text: &str) {
        self.log.lock().unwrap().push(format!("out: {}", text));
    }

    async fn read_line(&mut self, _prompt: &str) -> Option<String> {
        let line = self.inputs.lock().unwrap().pop_front();
        if let Some(line) = &line {
            self.log.lock().unwrap().push(format!("in: {}", line));
        }
        line
    }
}

/// Model that replays a fixed script of responses
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatResponse, ProviderError>>>,
    requests: Arc<Mutex<Vec<ChatParams>>>,
    repeat_tool_call: Option<ToolCall>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ChatResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Arc::default(),
            repeat_tool_call: None,
        }
    }

    /// A model that never stops asking for the same tool
    pub fn always_calling(call: ToolCall) -> Self {
        Self {
            replies: Mutex::default(),
            requests: Arc::default(),
            repeat_tool_call: Some(call),
        }
    }

    /// Handle to the requests seen, usable after the model moved
    pub fn requests(&self) -> Arc<Mutex<Vec<ChatParams>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl Provider for ScriptedModel {
    async fn chat(&self, params: ChatParams) -> steward_provider::Result<ChatResponse> {
        let turn = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(params);
            requests.len()
        };
        if let Some(call) = &self.repeat_tool_call {
            let mut call = call.clone();
            call.id = format!("{}_{}", call.id, turn);
            return Ok(ChatResponse::with_tool_calls(vec![call]));
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatResponse::text("(script exhausted)")))
    }

    fn default_model(&self) -> String {
        "scripted".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// How a fake tool behaves when invoked
#[derive(Clone)]
pub enum Behavior {
    Reply(String),
    Fail(String),
    Delayed(u64, String),
    Panic,
    EchoArgs,
}

/// In-memory tool provider that records its invocations
pub struct FakeProvider {
    name: String,
    tools: Vec<(String, Behavior)>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    shut_down: Arc<AtomicBool>,
}

impl FakeProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tools: Vec::new(),
            calls: Arc::default(),
            shut_down: Arc::default(),
        }
    }

    pub fn tool(mut self, name: &str, behavior: Behavior) -> Self {
        self.tools.push((name.to_string(), behavior));
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<(String, Value)>>> {
        self.calls.clone()
    }

    pub fn shut_down_flag(&self) -> Arc<AtomicBool> {
        self.shut_down.clone()
    }
}

#[async_trait]
impl ToolProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn discover(&self) -> Result<Vec<ToolSpec>, ToolError> {
        Ok(self
            .tools
            .iter()
            .map(|(name, _)| {
                ToolSpec::new(
                    name.clone(),
                    format!("fake {}", name),
                    json!({ "type": "object", "properties": {} }),
                )
            })
            .collect())
    }

    async fn invoke(&self, tool: &str, args: Value) -> Result<String, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool.to_string(), args.clone()));

        let behavior = self
            .tools
            .iter()
            .find(|(name, _)| name == tool)
            .map(|(_, b)| b.clone())
            .ok_or_else(|| ToolError::NotFound(tool.to_string()))?;

        match behavior {
            Behavior::Reply(text) => Ok(text),
            Behavior::Fail(reason) => Err(ToolError::Execution(reason)),
            Behavior::Delayed(ms, text) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(text)
            }
            Behavior::Panic => panic!("tool `{}` crashed", tool),
            Behavior::EchoArgs => Ok(args.to_string()),
        }
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// Provider whose discovery always fails
pub struct UnreachableProvider;

#[async_trait]
impl ToolProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn discover(&self) -> Result<Vec<ToolSpec>, ToolError> {
        Err(ToolError::Transport("connection refused".to_string()))
    }

    async fn invoke(&self, tool: &str, _args: Value) -> Result<String, ToolError> {
        Err(ToolError::NotFound(tool.to_string()))
    }
}

pub fn tool_call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall::new(id, name, args.to_string())
}
