//! Difficulty-tiered explanation requests.
//!
//! Builds the prompts that ask the agent for beginner, intermediate and
//! expert explanations, and keeps the last exchange around for follow-ups.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::Result;
use crate::agent::{AgentLoop, Context, LlmClient, Message, Response};
use crate::error::Error;

/// Audience level for an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    /// All three levels in one answer
    #[default]
    All,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
            Difficulty::All => "all",
        }
    }

    /// How to pitch a single-level explanation.
    pub fn guidance(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Simple analogies, no jargon, explain as if to a complete beginner",
            Difficulty::Intermediate => "Technical details, basic math, assume basic AI/ML knowledge",
            Difficulty::Expert => "Deep technical, mathematical formulations, implementation details",
            Difficulty::All => "",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            "all" => Ok(Difficulty::All),
            other => Err(Error::Config(format!(
                "Unknown difficulty '{}': expected beginner, intermediate, expert or all",
                other
            ))),
        }
    }
}

/// Prompt asking the agent to explain `term` at `difficulty`.
pub fn explain_prompt(term: &str, difficulty: Difficulty) -> String {
    match difficulty {
        Difficulty::All => format!(
            r#"Explain the AI/ML term "{term}" at three difficulty levels:

1. BEGINNER level: Explain it as if the reader has no prior knowledge of AI/ML.
   Use simple analogies and avoid technical jargon.

2. INTERMEDIATE level: Explain it for someone with basic AI/ML knowledge.
   Include technical details and mathematical concepts where relevant.

3. EXPERT level: Provide a deep, technical explanation suitable for researchers.
   Include mathematical formulations, implementation details, and connections to related concepts.

First, use the fetch_wikipedia_definition tool to get the base definition.
Then, use your knowledge to expand and adapt it to each difficulty level.

Format all three explanations as a single response with these section headers:

BEGINNER LEVEL:
[your beginner explanation here]

INTERMEDIATE LEVEL:
[your intermediate explanation here]

EXPERT LEVEL:
[your expert explanation here]

Reply exactly once with the complete response containing all three levels."#
        ),
        level => format!(
            r#"Explain the AI/ML term "{term}" at the {upper} level.

First, use the fetch_wikipedia_definition tool to get the base definition.
Then, adapt it to the {level} level: {guidance}

Provide a clear, structured explanation."#,
            upper = level.as_str().to_uppercase(),
            guidance = level.guidance(),
        ),
    }
}

/// Prompt asking for more detail on part of a previous explanation.
pub fn follow_up_prompt(clarification: &str, term: &str) -> String {
    format!("Provide more details about: {} in the context of {}", clarification, term)
}

/// Runs explanation requests through the agent
pub struct Explainer<C: LlmClient> {
    agent: AgentLoop<C>,
    context: Context,
    history: Vec<Message>,
}

impl<C: LlmClient> Explainer<C> {
    pub fn new(agent: AgentLoop<C>, context: Context) -> Self {
        Self {
            agent,
            context,
            history: Vec::new(),
        }
    }

    /// Explain a term. Starts a fresh conversation.
    pub async fn explain(&mut self, term: &str, difficulty: Difficulty) -> Result<Response> {
        self.history.clear();
        self.ask(explain_prompt(term, difficulty)).await
    }

    /// Ask for more detail, keeping the previous explanation in view.
    pub async fn follow_up(&mut self, term: &str, clarification: &str) -> Result<Response> {
        self.ask(follow_up_prompt(clarification, term)).await
    }

    /// Get current history length.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    async fn ask(&mut self, prompt: String) -> Result<Response> {
        let msg = Message::user(prompt);
        let response = self.agent.run(&self.history, msg.clone(), &self.context).await?;

        self.history.push(msg);
        self.history.push(Message::assistant(response.content.clone()));

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FakeLlmClient;

    #[test]
    fn test_all_levels_prompt() {
        let prompt = explain_prompt("cross-entropy loss", Difficulty::All);
        assert!(prompt.starts_with(r#"Explain the AI/ML term "cross-entropy loss" at three difficulty levels"#));
        for header in ["BEGINNER LEVEL:", "INTERMEDIATE LEVEL:", "EXPERT LEVEL:"] {
            assert!(prompt.contains(header));
        }
        assert!(prompt.contains("fetch_wikipedia_definition"));
    }

    #[test]
    fn test_single_level_prompt() {
        let prompt = explain_prompt("dropout", Difficulty::Intermediate);
        assert!(prompt.contains("at the INTERMEDIATE level"));
        assert!(prompt.contains("adapt it to the intermediate level: Technical details, basic math"));
        assert!(!prompt.contains("EXPERT LEVEL:"));
    }

    #[test]
    fn test_follow_up_prompt() {
        assert_eq!(
            follow_up_prompt("the log term", "cross-entropy loss"),
            "Provide more details about: the log term in the context of cross-entropy loss"
        );
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Expert".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert_eq!(" all ".parse::<Difficulty>().unwrap(), Difficulty::All);
        assert!("wizard".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::All);
    }

    #[tokio::test]
    async fn test_explain_then_follow_up() {
        let client = FakeLlmClient::new(vec!["BEGINNER LEVEL: ...", "The log term penalises..."]);
        let mut explainer = Explainer::new(AgentLoop::new(client, 5), Context::test());

        let first = explainer.explain("cross-entropy loss", Difficulty::All).await.unwrap();
        assert_eq!(first.content, "BEGINNER LEVEL: ...");
        assert_eq!(explainer.history_len(), 2);

        let second = explainer.follow_up("cross-entropy loss", "the log term").await.unwrap();
        assert_eq!(second.content, "The log term penalises...");
        assert_eq!(explainer.history_len(), 4);
    }

    #[tokio::test]
    async fn test_new_term_resets_history() {
        let client = FakeLlmClient::new(vec!["one", "two"]);
        let mut explainer = Explainer::new(AgentLoop::new(client, 5), Context::test());

        explainer.explain("softmax", Difficulty::Beginner).await.unwrap();
        explainer.explain("relu", Difficulty::Beginner).await.unwrap();
        assert_eq!(explainer.history_len(), 2);
    }
}
