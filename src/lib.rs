//! Financial Web Analyst
//!
//! Answers financial questions with a Gemini-backed agent that must search
//! the web before answering, then splits the agent's text into an answer
//! and the URLs it cited.
//!
//! FLOW:
//! REQUEST → VALIDATE → AGENT (MODEL ⇄ SEARCH) → PARSE → RESPONSE

pub mod agent;
pub mod analyst;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use agent::{AgentRunner, ToolCallingAgent};
pub use analyst::{parse_response, FinancialAnalyst};
pub use config::Settings;
pub use error::AnalystError;
pub use models::*;
