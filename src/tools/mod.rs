//! Tool trait and registry
//!
//! Tools are what the agent may call between model turns. The only
//! production tool is the Tavily-backed financial web search.

use crate::llm::ToolDeclaration;
use crate::models::{ToolInput, ToolOutput};
use crate::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod web_search;
pub use web_search::{SearchHit, TavilySearchTool, WEB_SEARCH_TOOL_NAME};

/// Trait for a single tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;
    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations advertised to the model, in name order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .values()
            .map(|tool| ToolDeclaration {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry holding only the financial web search tool
pub fn create_default_registry(search: TavilySearchTool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(search));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the parameters back"
        }

        fn parameters(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
            Ok(ToolOutput::ok(input.parameters.clone()))
        }
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(EchoTool));

        let tool = registry.get("echo").unwrap();
        let output = tool
            .execute(&ToolInput {
                tool_name: "echo".to_string(),
                parameters: json!({ "value": 7 }),
            })
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.data["value"], 7);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_declarations() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let declarations = registry.declarations();
        assert_eq!(registry.list(), vec!["echo"]);
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].description, "Echo the parameters back");
    }
}
