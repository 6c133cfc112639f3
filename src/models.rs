//! Core data models for the financial web analyst
//!
//! All records are per-request values; nothing here is persisted.

use crate::error::AnalystError;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Profile used when the client does not send one
pub const DEFAULT_PROFILE: &str = "a retail investor";

pub const QUERY_REQUIRED_MESSAGE: &str = "Invalid request: 'query' field is required.";

//
// ================= Request =================
//

/// Wire shape of `POST /api/analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

/// A validated analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub query: String,
    pub profile: String,
}

impl AnalysisRequest {
    pub fn new(query: impl Into<String>, profile: Option<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(AnalystError::ValidationError(
                "'query' field is required.".to_string(),
            ));
        }

        // Blank and null profiles count as "not given", unlike an explicit
        // non-empty profile which is passed through verbatim.
        let profile = profile
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        Ok(Self { query, profile })
    }
}

impl TryFrom<AnalyzeBody> for AnalysisRequest {
    type Error = AnalystError;

    fn try_from(body: AnalyzeBody) -> Result<Self> {
        let query = body.query.ok_or_else(|| {
            AnalystError::ValidationError("'query' field is required.".to_string())
        })?;
        AnalysisRequest::new(query, body.profile)
    }
}

//
// ================= Agent I/O =================
//

/// Values interpolated into the human message of the agent prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInput {
    pub query: String,
    pub profile: String,
}

/// Unstructured text produced by the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRawOutput {
    pub text: String,
}

impl AgentRawOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

//
// ================= Result =================
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub answer: String,
    pub sources: Vec<String>,
}

impl AnalysisResult {
    /// Degraded result returned when the agent invocation fails
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self {
            answer: format!("An error occurred during analysis: {}", message),
            sources: Vec::new(),
        }
    }
}

//
// ================= Tool I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool_name: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: serde_json::json!({ "error": message }),
            error: Some(message),
        }
    }
}
