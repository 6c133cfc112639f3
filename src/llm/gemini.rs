//! Gemini API client with function calling
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{ChatMessage, ChatModel, ModelTurn, ToolCall, ToolDeclaration};
use crate::error::AnalystError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiChatModel {
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AnalystError::UnavailableError(
                "GOOGLE_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
            temperature,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(
        &self,
        system: &str,
        history: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> GeminiRequest {
        let tools = if tools.is_empty() {
            None
        } else {
            Some(vec![GeminiTool {
                function_declarations: tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    })
                    .collect(),
            }])
        };

        GeminiRequest {
            contents: history.iter().map(to_content).collect(),
            system_instruction: SystemInstruction {
                parts: vec![Part::text(system)],
            },
            tools,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<ModelTurn> {
        let request = self.build_request(system, history, tools);

        debug!(
            model = %self.model,
            turns = request.contents.len(),
            tool_count = tools.len(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                AnalystError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response ({}): {}", status, error_text);
            return Err(AnalystError::LlmError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AnalystError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini response received"
            );
        }

        interpret_response(gemini_response)
    }
}

fn to_content(message: &ChatMessage) -> Content {
    match message {
        ChatMessage::User(text) => Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        },
        ChatMessage::Model { text, tool_calls } => {
            let mut parts = Vec::with_capacity(tool_calls.len() + 1);
            if let Some(text) = text {
                parts.push(Part::text(text));
            }
            parts.extend(tool_calls.iter().map(|call| Part {
                function_call: Some(FunctionCall {
                    name: call.name.clone(),
                    args: Some(call.args.clone()),
                }),
                ..Part::default()
            }));
            Content {
                role: Some("model".to_string()),
                parts,
            }
        }
        ChatMessage::ToolResults(results) => Content {
            role: Some("user".to_string()),
            parts: results
                .iter()
                .map(|result| Part {
                    function_response: Some(FunctionResponse {
                        name: result.name.clone(),
                        // functionResponse.response must be a JSON object
                        response: match &result.content {
                            Value::Object(_) => result.content.clone(),
                            other => json!({ "content": other }),
                        },
                    }),
                    ..Part::default()
                })
                .collect(),
        },
    }
}

fn interpret_response(response: GeminiResponse) -> Result<ModelTurn> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        AnalystError::LlmError("No response from Gemini API".to_string())
    })?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    for part in parts {
        if let Some(call) = part.function_call {
            calls.push(ToolCall {
                name: call.name,
                args: call.args.unwrap_or_else(|| json!({})),
            });
        } else if let Some(text) = part.text {
            texts.push(text);
        }
    }

    let text = if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    };

    if !calls.is_empty() {
        return Ok(ModelTurn::ToolCalls { text, calls });
    }

    text.map(ModelTurn::Final).ok_or_else(|| {
        AnalystError::LlmError(format!(
            "Empty response from Gemini (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    args: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}
