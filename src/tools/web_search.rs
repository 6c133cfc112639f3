//! Tavily-backed web search tool

use super::Tool;
use crate::error::AnalystError;
use crate::models::{ToolInput, ToolOutput};
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

pub const WEB_SEARCH_TOOL_NAME: &str = "financial_web_search";

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

const WEB_SEARCH_DESCRIPTION: &str = "A tool that performs a web search to find real-time financial information, such as quarterly earnings, stock performance, and market news. Use this for any user query that requires up-to-date data.";

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

pub struct TavilySearchTool {
    client: Client,
    api_key: String,
    endpoint: String,
    max_results: u32,
}

impl TavilySearchTool {
    pub fn new(api_key: String, max_results: u32, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AnalystError::UnavailableError(
                "TAVILY_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: TAVILY_SEARCH_URL.to_string(),
            max_results: max_results.max(1),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            search_depth: "basic",
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Tavily request failed: {}", e);
                AnalystError::SearchError(format!("Tavily request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalystError::SearchError(format!(
                "Tavily returned {}: {}",
                status, body
            )));
        }

        let parsed: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| AnalystError::SearchError(format!("Invalid Tavily response: {}", e)))?;

        let mut hits = parsed.results;
        hits.truncate(self.max_results as usize);
        Ok(hits)
    }
}

fn require_query(input: &ToolInput) -> Result<String> {
    input
        .parameters
        .get("query")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AnalystError::InvalidToolInput(format!(
                "Expected a non-empty 'query' string for {}",
                WEB_SEARCH_TOOL_NAME
            ))
        })
}

/// Shape the model sees: one object per hit
pub fn hits_to_observation(hits: &[SearchHit]) -> Value {
    Value::Array(
        hits.iter()
            .map(|hit| {
                json!({
                    "title": hit.title,
                    "url": hit.url,
                    "content": hit.content,
                })
            })
            .collect(),
    )
}

#[async_trait::async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &'static str {
        WEB_SEARCH_TOOL_NAME
    }

    fn description(&self) -> &'static str {
        WEB_SEARCH_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A precise web search query, e.g. 'AAPL Q2 2024 financial results'"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let query = require_query(input)?;
        let hits = self.search(&query).await?;

        debug!(query = %query, hits = hits.len(), "Web search complete");

        Ok(ToolOutput::ok(hits_to_observation(&hits)))
    }
}
