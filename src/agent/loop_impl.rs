//! Agent loop - core message processing

use tracing::{debug, info};
use crate::Result;
use crate::error::Error;
use super::llm::LlmClient;
use super::message::{Message, Response, ToolCallRequest};
use super::context::Context;

/// The agent loop processes messages through LLM and tool execution
pub struct AgentLoop<C: LlmClient> {
    client: C,
    max_steps: usize,
}

impl<C: LlmClient> AgentLoop<C> {
    /// Create a new agent loop
    pub fn new(client: C, max_steps: usize) -> Self {
        Self {
            client,
            max_steps,
        }
    }

    pub fn model(&self) -> &str {
        self.client.default_model()
    }

    /// Run the agent loop for a single request
    pub async fn run(&self, history: &[Message], message: Message, ctx: &Context) -> Result<Response> {
        let mut messages = ctx.build_messages(history, &message.content);
        let tools = ctx.tool_runner.definitions();
        let mut tools_used = Vec::new();

        info!("Starting agent run ({} chars, model {})", message.content.len(), self.model());

        for step in 0..self.max_steps {
            debug!("Step {}/{}", step + 1, self.max_steps);

            let response = self.client.chat(&messages, &tools).await?;

            if !response.has_tool_calls() {
                let content = response.content.unwrap_or_default();
                info!("Agent completed in {} steps with {} chars", step + 1, content.len());
                return Ok(Response {
                    content,
                    steps: step + 1,
                    tools_used,
                });
            }

            messages.push(Message::assistant_with_tools(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for tool_call in &response.tool_calls {
                let result = self.execute_tool(ctx, tool_call).await;
                tools_used.push(tool_call.name.clone());
                messages.push(Message::tool_result(&tool_call.id, result));
            }
        }

        Err(Error::MaxIterations)
    }

    async fn execute_tool(&self, ctx: &Context, tool_call: &ToolCallRequest) -> String {
        debug!("Executing tool: {} with args: {}", tool_call.name, tool_call.arguments);

        match ctx.tool_runner.execute(&tool_call.name, tool_call.arguments.clone()).await {
            Ok(result) => {
                debug!("Tool {} succeeded: {} chars", tool_call.name, result.len());
                result
            }
            Err(e) => {
                let error_msg = format!("Error: {}", e);
                debug!("Tool {} failed: {}", tool_call.name, error_msg);
                error_msg
            }
        }
    }
}
