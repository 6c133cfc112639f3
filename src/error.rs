//! Error types for the financial web analyst

use thiserror::Error;

/// Result type alias for analyst operations
pub type Result<T> = std::result::Result<T, AnalystError>;

#[derive(Error, Debug)]
pub enum AnalystError {

    // =============================
    // Request Errors
    // =============================

    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Agent unavailable: {0}")]
    UnavailableError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Invocation Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let err: AnalystError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AnalystError::SerializationError(_)));
    }

    #[test]
    fn test_display_carries_message() {
        let err = AnalystError::LlmError("Gemini API error: 429".into());
        assert_eq!(err.to_string(), "LLM error: Gemini API error: 429");
    }
}
