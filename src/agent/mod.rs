//! Tool-calling agent executor
//!
//! MODEL → TOOL CALLS → OBSERVE → MODEL → ... → FINAL TEXT
//!
//! Malformed tool calls (unknown tool, bad arguments) and failing tools are
//! reported back to the model as observations so it can correct itself.
//! Only model failures abort the run.

use crate::error::AnalystError;
use crate::llm::{ChatMessage, ChatModel, ModelTurn, ToolCall, ToolResult};
use crate::models::{AgentInput, AgentRawOutput, ToolInput};
use crate::prompts::PromptTemplate;
use crate::tools::ToolRegistry;
use crate::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// The capability the analyst delegates to
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn invoke(&self, input: &AgentInput) -> Result<AgentRawOutput>;
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Model turns allowed before giving up
    pub max_iterations: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: crate::config::DEFAULT_MAX_ITERATIONS,
        }
    }
}

pub struct ToolCallingAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    prompt: PromptTemplate,
    config: ExecutorConfig,
}

impl ToolCallingAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        prompt: PromptTemplate,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            model,
            tools,
            prompt,
            config,
        }
    }

    async fn run_tool(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            let err = AnalystError::ToolNotFound(call.name.clone());
            warn!(tool = %call.name, "Model requested an unknown tool");
            return error_observation(call, &err, Some(self.tools.list().join(", ")));
        };

        if !call.args.is_object() {
            let err = AnalystError::InvalidToolInput("tool arguments must be a JSON object".to_string());
            warn!(tool = %call.name, args = %call.args, "Malformed tool arguments");
            return error_observation(call, &err, None);
        }

        let input = ToolInput {
            tool_name: call.name.clone(),
            parameters: call.args.clone(),
        };

        let started = Instant::now();
        let outcome = tool.execute(&input).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) if output.success => {
                info!(tool = %call.name, elapsed_ms, "Tool call succeeded");
                ToolResult {
                    name: call.name.clone(),
                    content: output.data,
                }
            }
            Ok(output) => {
                let message = output.error.unwrap_or_else(|| "tool execution failed".to_string());
                warn!(tool = %call.name, elapsed_ms, error = %message, "Tool reported failure");
                error_observation(call, &AnalystError::ToolError(message), None)
            }
            Err(e) => {
                warn!(tool = %call.name, elapsed_ms, error = %e, "Tool call failed");
                error_observation(call, &e, None)
            }
        }
    }
}

fn error_observation(call: &ToolCall, err: &AnalystError, available: Option<String>) -> ToolResult {
    let mut content = json!({
        "error": err.to_string(),
        "hint": "Fix the tool call and try again.",
    });
    if let Some(available) = available {
        content["available_tools"] = json!(available);
    }
    ToolResult {
        name: call.name.clone(),
        content,
    }
}

#[async_trait]
impl AgentRunner for ToolCallingAgent {
    async fn invoke(&self, input: &AgentInput) -> Result<AgentRawOutput> {
        let declarations = self.tools.declarations();
        let mut scratchpad = vec![ChatMessage::User(self.prompt.render_human(input))];

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration,
                max_iterations = self.config.max_iterations,
                model = %self.model.model_name(),
                "Agent iteration started"
            );

            let turn = self
                .model
                .complete(self.prompt.system(), &scratchpad, &declarations)
                .await?;

            match turn {
                ModelTurn::Final(text) => {
                    info!(iteration, chars = text.len(), "Agent produced final answer");
                    return Ok(AgentRawOutput::new(text));
                }
                ModelTurn::ToolCalls { text, calls } => {
                    debug!(iteration, calls = calls.len(), "Model requested tool calls");

                    let mut results = Vec::with_capacity(calls.len());
                    for call in &calls {
                        results.push(self.run_tool(call).await);
                    }

                    scratchpad.push(ChatMessage::Model {
                        text,
                        tool_calls: calls,
                    });
                    scratchpad.push(ChatMessage::ToolResults(results));
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached without a final answer"
        );
        Ok(AgentRawOutput::new(ITERATION_LIMIT_MESSAGE))
    }
}
