//! Wikipedia tools - definition and context lookups

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use crate::Result;
use crate::lookup::{Definition, Lookup, LookupError, TermContext};
use crate::wiki::KnowledgeBase;
use super::{required_str, Tool};

/// Render a definition lookup the way the agent reads it.
///
/// Every outcome becomes text; a failed search fallback reads as not found.
pub fn render_definition(term: &str, result: std::result::Result<Definition, LookupError>) -> String {
    match result {
        Ok(definition) => definition.to_string(),
        Err(e) if e.is_not_found() => format!(
            "Could not find Wikipedia page for '{}'. Please try a different term.",
            term
        ),
        Err(e) => format!("Error fetching definition: {}", e),
    }
}

/// Render a context lookup the way the agent reads it.
pub fn render_context(term: &str, result: std::result::Result<TermContext, LookupError>) -> String {
    match result {
        Ok(context) => context.to_string(),
        Err(e) if e.is_not_found() => format!("No context found for '{}'", term),
        Err(e) => format!("Error fetching context: {}", e),
    }
}

fn term_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "term": {
                "type": "string",
                "description": description
            }
        },
        "required": ["term"]
    })
}

/// Fetches a truncated Wikipedia definition for a term
pub struct DefinitionTool<K: KnowledgeBase> {
    lookup: Lookup<K>,
}

impl<K: KnowledgeBase> DefinitionTool<K> {
    pub fn new(lookup: Lookup<K>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<K: KnowledgeBase + 'static> Tool for DefinitionTool<K> {
    fn name(&self) -> &str { "fetch_wikipedia_definition" }

    fn description(&self) -> &str {
        "Fetches the Wikipedia definition for a given AI/ML term. \
         The text is truncated to a manageable length."
    }

    fn parameters(&self) -> Value {
        term_schema("The AI/ML term to look up (e.g., \"cross-entropy loss\")")
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let term = required_str(&params, "term")?;
        let result = self.lookup.definition(term).await;
        debug!("Definition lookup for '{}': ok={}", term, result.is_ok());
        Ok(render_definition(term, result))
    }
}

/// Gets categories and related terms for a term
pub struct ContextTool<K: KnowledgeBase> {
    lookup: Lookup<K>,
}

impl<K: KnowledgeBase> ContextTool<K> {
    pub fn new(lookup: Lookup<K>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<K: KnowledgeBase + 'static> Tool for ContextTool<K> {
    fn name(&self) -> &str { "get_term_context" }

    fn description(&self) -> &str {
        "Gets additional context about a term (related terms, categories). \
         Useful for multi-step reasoning."
    }

    fn parameters(&self) -> Value {
        term_schema("The AI/ML term to get context for")
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let term = required_str(&params, "term")?;
        let result = self.lookup.context(term).await;
        debug!("Context lookup for '{}': ok={}", term, result.is_ok());
        Ok(render_context(term, result))
    }
}
