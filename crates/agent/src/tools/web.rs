//! Web search through the Brave Search API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ToolError, ToolTrait};

pub const BRAVE_SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// `web_search` tool
pub struct WebSearchTool {
    api_key: String,
    max_results: u32,
    endpoint: String,
    client: reqwest::Client,
}

impl WebSearchTool {
    /// Falls back to `BRAVE_API_KEY` when no key is given
    pub fn new(api_key: Option<String>, max_results: u32) -> Self {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("BRAVE_API_KEY").ok())
            .unwrap_or_default();
        Self {
            api_key,
            max_results: max_results.max(1),
            endpoint: BRAVE_SEARCH_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &steward_config::Config) -> Self {
        Self::new(config.brave_api_key(), config.web_search_max_results())
    }

    /// Point the tool at another search endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
    max_results: Option<u32>,
}

#[derive(Deserialize, Default)]
struct BraveResponse {
    #[serde(default)]
    web: BraveWeb,
}

#[derive(Deserialize, Default)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

fn format_results(results: &[BraveResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nLink: {}\nSummary: {}\n---",
                r.title, r.url, r.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ToolTrait for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns title, link and summary for each result."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search terms" },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results (default 5)",
                    "minimum": 1,
                    "maximum": 20
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        if self.api_key.is_empty() {
            return Err(ToolError::Execution(
                "web search is not configured (set tools.web.search.api_key or BRAVE_API_KEY)"
                    .to_string(),
            ));
        }

        let args: WebSearchArgs = serde_json::from_value(args)?;
        let count = args.max_results.unwrap_or(self.max_results).clamp(1, 20);
        debug!("web search: {} ({} results)", args.query, count);
        let count_param = count.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", args.query.as_str()), ("count", count_param.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Execution(format!(
                "search api returned {}",
                status
            )));
        }

        let data: BraveResponse = response.json().await?;
        let results: Vec<_> = data.web.results.into_iter().take(count as usize).collect();
        if results.is_empty() {
            return Ok("No results found.".to_string());
        }

        Ok(format_results(&results))
    }
}
