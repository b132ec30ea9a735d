//! OpenAI-compatible chat completions node
//!
//! Works against Groq, OpenRouter, OpenAI and any server that speaks the
//! `/chat/completions` tool-calling dialect.

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

/// Endpoint family inferred from the key or configured base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Groq,
    OpenRouter,
    OpenAi,
}

impl Endpoint {
    fn detect(api_key: &str, api_base: Option<&str>) -> Self {
        if let Some(base) = api_base {
            if base.contains("groq") {
                return Endpoint::Groq;
            }
            if base.contains("openrouter") {
                return Endpoint::OpenRouter;
            }
        }
        if api_key.starts_with("gsk_") {
            Endpoint::Groq
        } else if api_key.starts_with("sk-or-") {
            Endpoint::OpenRouter
        } else {
            Endpoint::OpenAi
        }
    }

    fn base(&self) -> &'static str {
        match self {
            Endpoint::Groq => "https://api.groq.com/openai/v1",
            Endpoint::OpenRouter => "https://openrouter.ai/api/v1",
            Endpoint::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Endpoint::Groq => "llama-3.3-70b-versatile",
            Endpoint::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
            Endpoint::OpenAi => "gpt-4o-mini",
        }
    }
}

/// OpenAI-compatible provider
pub struct OpenAiCompatProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
    endpoint: Endpoint,
}

impl OpenAiCompatProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let api_key = api_key.into();
        let api_base = api_base.filter(|b| !b.is_empty());
        let endpoint = Endpoint::detect(&api_key, api_base.as_deref());

        let api_base = api_base
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.base().to_string());
        let default_model = default_model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| endpoint.default_model().to_string());

        Self {
            client: Client::new(),
            api_key,
            api_base,
            default_model,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| {
                let mut obj = json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                });
                if let Some(tool_calls) = &m.tool_calls {
                    obj["tool_calls"] = json!(tool_calls);
                }
                if let Some(tool_call_id) = &m.tool_call_id {
                    obj["tool_call_id"] = json!(tool_call_id);
                }
                if let Some(name) = &m.name {
                    obj["name"] = json!(name);
                }
                obj
            })
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = match &params.tool_choice {
                ToolChoice::Auto => json!("auto"),
                ToolChoice::Required(name) => {
                    json!({"type": "function", "function": {"name": name}})
                }
                ToolChoice::None => json!("none"),
            };
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];
        let content = message["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let function = &call["function"];
                let arguments = match &function["arguments"] {
                    serde_json::Value::String(raw) => raw.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };

                tool_calls.push(ToolCall {
                    id: call["id"].as_str().unwrap_or("").to_string(),
                    name: function["name"].as_str().unwrap_or("").to_string(),
                    arguments,
                });
            }
        }

        let usage = if let Some(usage) = json["usage"].as_object() {
            let field = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            Usage {
                prompt_tokens: field("prompt_tokens"),
                completion_tokens: field("completion_tokens"),
                total_tokens: field("total_tokens"),
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }
        trace!("posting chat completion to {}", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(&params);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        let text = response.text().await?;

        if !status.is_success() {
            // Gateways answer with HTML pages, so the body may not be JSON.
            let error = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("http {}", status.as_u16()));
            return Err(ProviderError::Api(error));
        }

        let json: serde_json::Value = serde_json::from_str(&text)?;

        debug!(
            "model returned {} tool call(s)",
            json["choices"][0]["message"]["tool_calls"]
                .as_array()
                .map(|v| v.len())
                .unwrap_or(0)
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
