//! Tool runner - manages and executes tools

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::Result;
use crate::error::Error;
use crate::lookup::Lookup;
use crate::wiki::KnowledgeBase;
use super::Tool;
use super::wiki::{ContextTool, DefinitionTool};

/// Tool definition for LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool runner manages registered tools and executes them
pub struct ToolRunner {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRunner {
    /// Create an empty tool runner
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a tool runner with the term lookup tools
    pub fn new_with_defaults<K: KnowledgeBase + 'static>(lookup: Lookup<K>) -> Self {
        let mut runner = Self::new();

        runner.register(DefinitionTool::new(lookup.clone()));
        runner.register(ContextTool::new(lookup));

        runner
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Get tool definitions for LLM, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values()
            .map(|t| t.to_definition())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, params: Value) -> Result<String> {
        let tool = self.tools.get(name)
            .ok_or_else(|| Error::Tool(format!("Unknown tool: {}", name)))?;

        tool.execute(params).await
    }

    /// Check if a tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List registered tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupSettings;
    use crate::tools::DummyTool;
    use crate::wiki::StaticKnowledgeBase;

    #[tokio::test]
    async fn test_tool_runner_register_and_execute() {
        let mut runner = ToolRunner::new();
        runner.register(DummyTool {
            name: "test_tool".to_string(),
            result: "success".to_string(),
        });

        assert!(runner.has("test_tool"));

        let result = runner.execute("test_tool", serde_json::json!({})).await.unwrap();
        assert_eq!(result, "success");
    }

    #[tokio::test]
    async fn test_tool_runner_unknown_tool() {
        let runner = ToolRunner::new();
        let result = runner.execute("unknown", serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_default_tools() {
        let lookup = Lookup::new(StaticKnowledgeBase::new(), LookupSettings::default());
        let runner = ToolRunner::new_with_defaults(lookup);

        let names: Vec<String> = runner.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["fetch_wikipedia_definition", "get_term_context"]);

        let out = runner
            .execute("get_term_context", serde_json::json!({"term": "x"}))
            .await
            .unwrap();
        assert_eq!(out, "No context found for 'x'");
    }
}
