//! Financial analyst
//!
//! Wraps the agent capability and turns its raw text into an
//! `AnalysisResult`. Failures never escape `run_analysis`.

use crate::agent::{AgentRunner, ExecutorConfig, ToolCallingAgent};
use crate::config::Settings;
use crate::llm::GeminiChatModel;
use crate::models::{AgentInput, AnalysisResult};
use crate::prompts::PromptTemplate;
use crate::tools::{create_default_registry, TavilySearchTool};
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

pub mod parser;
pub use parser::{find_urls, parse_response, split_on_sources_marker};

pub struct FinancialAnalyst {
    runner: Arc<dyn AgentRunner>,
}

impl FinancialAnalyst {
    pub fn new(runner: Arc<dyn AgentRunner>) -> Self {
        Self { runner }
    }

    /// Build the production agent: Gemini + Tavily search + analyst prompt
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let credentials = settings.agent_credentials()?;
        let timeout = Duration::from_secs(settings.http_timeout_secs);

        let model = GeminiChatModel::new(
            credentials.google_api_key,
            settings.model.clone(),
            settings.temperature,
            timeout,
        )?;
        let search = TavilySearchTool::new(
            credentials.tavily_api_key,
            settings.max_search_results,
            timeout,
        )?;

        let agent = ToolCallingAgent::new(
            Arc::new(model),
            create_default_registry(search),
            PromptTemplate::financial_analyst(),
            ExecutorConfig {
                max_iterations: settings.max_iterations,
            },
        );

        info!(
            model = %settings.model,
            temperature = settings.temperature,
            max_search_results = settings.max_search_results,
            "Financial analyst agent configured"
        );

        Ok(Self::new(Arc::new(agent)))
    }

    pub async fn run_analysis(&self, query: &str, profile: &str) -> AnalysisResult {
        info!(query = %query, "Running agent for query");

        let input = AgentInput {
            query: query.to_string(),
            profile: profile.to_string(),
        };

        let started = Instant::now();
        match self.runner.invoke(&input).await {
            Ok(output) => {
                let result = parse_response(&output.text);
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    sources = result.sources.len(),
                    "Analysis complete"
                );
                result
            }
            Err(e) => {
                error!(elapsed_ms = started.elapsed().as_millis() as u64, "Agent error: {}", e);
                AnalysisResult::failed(e)
            }
        }
    }
}
