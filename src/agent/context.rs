//! Context builder for agent prompts.
//!
//! Holds the tool runner and assembles the message list for each request,
//! windowing history so follow-ups stay bounded.

use crate::lookup::Lookup;
use crate::tools::ToolRunner;
use crate::wiki::KnowledgeBase;

use super::message::Message;

/// Maximum history messages to include in prompt (prevents unbounded growth).
const MAX_HISTORY_MESSAGES: usize = 20;

/// Context holds all state for an agent interaction.
pub struct Context {
    pub tool_runner: ToolRunner,
    /// Language edition the tools read from
    pub language: String,
}

impl Context {
    /// Create a context whose tools read from `lookup`.
    pub fn new<K: KnowledgeBase + 'static>(lookup: Lookup<K>, language: impl Into<String>) -> Self {
        Self {
            tool_runner: ToolRunner::new_with_defaults(lookup),
            language: language.into(),
        }
    }

    /// Create a context around an arbitrary tool runner.
    pub fn with_runner(tool_runner: ToolRunner) -> Self {
        Self {
            tool_runner,
            language: "en".to_string(),
        }
    }

    /// Create a test context with no tools.
    #[cfg(test)]
    pub fn test() -> Self {
        Self::with_runner(ToolRunner::new())
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        let mut tools: Vec<String> = self.tool_runner.definitions()
            .into_iter()
            .map(|d| format!("- `{}`: {}", d.name, d.description))
            .collect();
        if tools.is_empty() {
            tools.push("(none)".to_string());
        }

        format!(
            r#"# AI Term Explainer

You explain artificial intelligence and machine learning terms to readers
of different backgrounds. Ground every explanation in the reference text
your tools return, then expand on it with your own knowledge.

## Tools
{}

The tools read the `{}` Wikipedia. If a lookup reports that nothing was
found, try a closely related or more common name for the term once, then
explain from your own knowledge and say so.

When you have everything you need, reply with the final explanation as
plain text. Reply once; do not split the answer across messages."#,
            tools.join("\n"),
            self.language
        )
    }

    /// Build messages list for LLM call with history windowing.
    pub fn build_messages(&self, history: &[Message], current: &str) -> Vec<Message> {
        let windowed_history = if history.len() > MAX_HISTORY_MESSAGES {
            &history[history.len() - MAX_HISTORY_MESSAGES..]
        } else {
            history
        };

        let mut messages = Vec::with_capacity(windowed_history.len() + 2);
        messages.push(Message::system(self.build_system_prompt()));
        messages.extend(windowed_history.iter().cloned());
        messages.push(Message::user(current));

        messages
    }
}
