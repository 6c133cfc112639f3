//! Chat model trait and conversation types
//!
//! The agent executor talks to the LLM only through `ChatModel`, so the loop
//! can be driven by a scripted model in tests.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod gemini;
pub use gemini::GeminiChatModel;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
}

/// The observation fed back to the model for one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub content: Value,
}

/// One entry of the agent scratchpad
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    User(String),
    Model {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    ToolResults(Vec<ToolResult>),
}

/// What the model decided to do on one turn
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    Final(String),
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
}

/// Function declaration advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<ModelTurn>;
}
