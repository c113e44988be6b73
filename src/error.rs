//! Error types for term-explainer

use thiserror::Error;

/// Result type alias for term-explainer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in term-explainer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    /// The knowledge base answered, but with an error payload or status.
    #[error("Knowledge base error ({code}): {info}")]
    KnowledgeBase { code: String, info: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Max iterations reached")]
    MaxIterations,

    #[error("{0}")]
    Other(String),
}
