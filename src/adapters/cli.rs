//! CLI adapter — interactive and single-term command line interface.
//!
//! The interactive loop asks for a term, prints the three-level explanation,
//! then asks whether it helped. A "no" leads to one follow-up question.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use inquire::{InquireError, Select, Text};

use crate::agent::{LlmClient, Response};
use crate::error::Error;
use crate::explain::{Difficulty, Explainer};
use crate::ui;
use crate::Result;

/// What the user thought of an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Helpful,
    /// Not helpful; carries what to elaborate on (may be empty).
    NeedsMore(String),
    Skip,
}

/// Source of post-explanation feedback.
pub trait FeedbackSource {
    fn ask(&mut self) -> Result<Feedback>;
}

/// Asks through terminal prompts.
pub struct PromptFeedback;

impl FeedbackSource for PromptFeedback {
    fn ask(&mut self) -> Result<Feedback> {
        let choice = match Select::new("Was this explanation helpful?", vec!["yes", "no", "skip"]).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => return Ok(Feedback::Skip),
            Err(e) => return Err(Error::Other(format!("Prompt failed: {}", e))),
        };

        match choice {
            "yes" => Ok(Feedback::Helpful),
            "no" => {
                let more = Text::new("What would you like to know more about?")
                    .prompt()
                    .unwrap_or_default();
                Ok(Feedback::NeedsMore(more))
            }
            _ => Ok(Feedback::Skip),
        }
    }
}

/// CLI channel for explanation sessions.
pub struct CliChannel<C: LlmClient> {
    explainer: Explainer<C>,
}

impl<C: LlmClient> CliChannel<C> {
    /// Create a new CLI channel.
    pub fn new(explainer: Explainer<C>) -> Self {
        Self { explainer }
    }

    /// Explain one term with a spinner while the agent works.
    pub async fn run_once(&mut self, term: &str, difficulty: Difficulty) -> Result<Response> {
        let pb = ui::spinner(&format!("Explaining '{}' ({})", term, difficulty));
        let result = self.explainer.explain(term, difficulty).await;
        pb.finish_and_clear();
        result
    }

    /// Run interactive loop on stdin with terminal prompts.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run_interactive_with(stdin.lock(), &mut PromptFeedback).await
    }

    /// Run interactive loop over any input and feedback source.
    pub async fn run_interactive_with<R, F>(&mut self, mut input: R, feedback: &mut F) -> Result<()>
    where
        R: BufRead,
        F: FeedbackSource,
    {
        let mut stdout = io::stdout();

        println!("{}", "AI Term Explainer - Interactive Mode".bold());
        println!("Enter an AI/ML term to get explanations at 3 difficulty levels.");
        println!("Type 'quit' to exit.");

        loop {
            print!("\n{}: ", "Enter an AI/ML term".blue().bold());
            stdout.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let term = line.trim();
            if term.is_empty() {
                continue;
            }

            if is_exit(term) {
                println!("Goodbye!");
                break;
            }

            ui::print_banner(&format!("Explaining: {}", term));

            match self.run_once(term, Difficulty::All).await {
                Ok(response) => println!("\n{}\n", response.content),
                Err(e) => {
                    ui::print_error(&e.to_string());
                    println!("Please try again with a different term.");
                    continue;
                }
            }

            let answer = feedback.ask().unwrap_or_else(|e| {
                ui::print_error(&e.to_string());
                Feedback::Skip
            });

            if let Feedback::NeedsMore(clarification) = answer {
                if !clarification.trim().is_empty() {
                    self.elaborate(term, clarification.trim()).await;
                }
            }
        }

        Ok(())
    }

    async fn elaborate(&mut self, term: &str, clarification: &str) {
        let pb = ui::spinner(&format!("Digging into '{}'", clarification));
        let result = self.explainer.follow_up(term, clarification).await;
        pb.finish_and_clear();

        match result {
            Ok(response) => println!("\n{}\n", response.content),
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    /// Get current history length.
    pub fn history_len(&self) -> usize {
        self.explainer.history_len()
    }
}

fn is_exit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q")
}
