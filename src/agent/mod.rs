//! Agent module — core agent logic.
//!
//! This module contains:
//! - Message types (Message, Response)
//! - LLM client trait and the OpenAI-compatible implementation
//! - Agent loop for processing requests
//! - Context builder for prompts
//!
//! # Adding a New LLM Provider
//!
//! See [`llm::ProviderRegistry`] for instructions.

mod context;
mod loop_impl;
mod message;

// LLM providers in submodule
pub mod llm;

// Re-exports for convenience
pub use context::Context;
pub use llm::{
    FakeLlmClient, LlmClient, LlmResponse, OpenAiCompatClient, Provider, ProviderRegistry,
    ProviderSettings, Usage,
};
pub use loop_impl::AgentLoop;
pub use message::{Message, Response, Role, ToolCallRequest};
