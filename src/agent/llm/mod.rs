//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait for swappable LLM providers
//! - [`ProviderRegistry`] for creating a client from the environment
//! - [`OpenAiCompatClient`], which serves every supported provider
//!
//! # Adding a New Provider
//!
//! 1. Add a variant to [`Provider`] with its env var, base URL and model
//! 2. If it does not speak the OpenAI dialect, implement `LlmClient`
//! 3. Wire it up in `ProviderRegistry::create()`

mod types;
mod openai;
mod provider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::tools::ToolDefinition;
use crate::Result;

pub use openai::OpenAiCompatClient;
pub use provider::{mask, Provider, ProviderSettings};

use super::message::{Message, ToolCallRequest};

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Text content of the response.
    pub content: Option<String>,

    /// Tool calls requested by the LLM.
    pub tool_calls: Vec<ToolCallRequest>,

    /// Reason the response finished.
    pub finish_reason: String,

    /// Token usage statistics.
    pub usage: Usage,
}

impl LlmResponse {
    /// Create a simple text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }

    /// Create a response that only calls tools.
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
            finish_reason: "tool_calls".to_string(),
            usage: Usage::default(),
        }
    }

    /// Check if response has tool calls.
    #[inline]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// LLM client trait — swappable provider abstraction.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send messages and get response.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Box<C> {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        (**self).chat(messages, tools).await
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }
}

/// Provider registry — creates LLM clients from API keys in the environment.
///
/// # Example
///
/// ```ignore
/// let (client, settings) = ProviderRegistry::create(&config)?;
/// println!("Using {} ({})", settings.provider, settings.model);
/// ```
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create an LLM client for the highest-priority provider with a key.
    pub fn create(config: &Config) -> Result<(Box<dyn LlmClient>, ProviderSettings)> {
        let settings = ProviderSettings::from_env(config.model.as_deref())?;
        let client = OpenAiCompatClient::new(&settings)?;
        Ok((Box::new(client), settings))
    }

    /// List available provider names.
    pub fn available() -> Vec<String> {
        Provider::ALL.iter().map(|p| p.to_string()).collect()
    }
}

/// Fake LLM client for testing.
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<LlmResponse>>,
    seen: std::sync::Mutex<Vec<Vec<Message>>>,
}

impl FakeLlmClient {
    /// Create with predefined text responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.iter().map(|s| LlmResponse::text(*s)).collect())
    }

    /// Create with an arbitrary response script.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create with a single tool call followed by a text response.
    pub fn with_tool_call(name: &str, args: serde_json::Value, final_response: &str) -> Self {
        let tool_response = LlmResponse::tool_calls(vec![ToolCallRequest {
            id: "tc_1".to_string(),
            name: name.to_string(),
            arguments: args,
        }]);

        Self::scripted(vec![tool_response, LlmResponse::text(final_response)])
    }

    /// Message lists received so far, one per `chat` call.
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }

        let mut responses = self.responses.lock()
            .map_err(|_| Error::Llm("Fake client poisoned".to_string()))?;
        responses
            .pop_front()
            .ok_or_else(|| Error::Llm("No more fake responses".to_string()))
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_llm_client() {
        let client = FakeLlmClient::new(vec!["Hello!", "World!"]);

        let resp1 = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp1.content.as_deref(), Some("Hello!"));

        let resp2 = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp2.content.as_deref(), Some("World!"));

        assert!(client.chat(&[], &[]).await.is_err());
        assert_eq!(client.seen().len(), 3);
    }

    #[tokio::test]
    async fn test_boxed_client_delegates() {
        let client: Box<dyn LlmClient> = Box::new(FakeLlmClient::new(vec!["boxed"]));
        let resp = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("boxed"));
        assert_eq!(client.default_model(), "fake-model");
    }

    #[test]
    fn test_available_providers() {
        let names = ProviderRegistry::available();
        assert_eq!(names.first().map(String::as_str), Some("OpenRouter"));
        assert_eq!(names.len(), 5);
    }
}
