//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;
use crate::Result;
use crate::error::Error;
use crate::tools::ToolDefinition;
use super::super::message::{Message, Role, ToolCallRequest};
use super::provider::{Provider, ProviderSettings};
use super::types::*;
use super::{LlmClient, LlmResponse, Usage};

/// Client for any provider exposing `/chat/completions`
#[derive(Clone)]
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    model: String,
    provider: Provider,
    client: Client,
}

impl OpenAiCompatClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.provider.base_url().to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            provider: settings.provider,
            client,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if self.provider == Provider::OpenRouter {
            headers.insert("X-Title", HeaderValue::from_static("AI Term Explainer"));
        }

        Ok(headers)
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(convert_message).collect(),
            tools: tools.iter().map(convert_tool).collect(),
            temperature: Some(0.7),
        }
    }
}

fn convert_message(m: &Message) -> ChatMessage {
    let role = match m.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let tool_calls: Option<Vec<WireToolCall>> = m.tool_calls.as_ref().map(|calls| {
        calls.iter().map(|tc| WireToolCall {
            id: tc.id.clone(),
            kind: "function".to_string(),
            function: WireFunctionCall {
                name: tc.name.clone(),
                arguments: tc.arguments.to_string(),
            },
        }).collect()
    });

    // Assistant turns that only call tools carry no text.
    let content = if m.content.is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(m.content.clone())
    };

    ChatMessage {
        role,
        content,
        tool_call_id: m.tool_call_id.clone(),
        tool_calls,
    }
}

fn convert_tool(t: &ToolDefinition) -> ToolSpec {
    ToolSpec {
        kind: "function",
        function: FunctionSpec {
            name: t.name.clone(),
            description: t.description.clone(),
            parameters: t.parameters.clone(),
        },
    }
}

fn parse_response(response: ChatResponse) -> Result<LlmResponse> {
    let choice = response.choices.into_iter().next()
        .ok_or_else(|| Error::Llm("No choices in response".to_string()))?;

    let tool_calls = choice.message.tool_calls.into_iter().map(|tc| {
        // Models occasionally emit arguments that are not valid JSON.
        let arguments = serde_json::from_str(&tc.function.arguments)
            .unwrap_or(Value::String(tc.function.arguments));
        ToolCallRequest {
            id: tc.id,
            name: tc.function.name,
            arguments,
        }
    }).collect();

    let usage = response.usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        content: choice.message.content,
        tool_calls,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        usage,
    })
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(provider = %self.provider, model = %self.model, messages = messages.len(), "Chat request");

        let response = self.client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::Llm(format!("{} API error ({}): {}", self.provider, status, error_text)));
        }

        let chat_response: ChatResponse = response.json().await?;
        let parsed = parse_response(chat_response)?;
        debug!(tokens = parsed.usage.total_tokens, finish = %parsed.finish_reason, "Chat response");
        Ok(parsed)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
