//! The tool-calling loop.

use std::sync::Arc;

use super::model::{AgentError, ChatModel, Message};
use crate::tools::{ToolContext, ToolRegistry};

/// Outcome of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentResult {
    /// Full conversation including the system prompt, tool calls and tool
    /// results; the last entry is the final assistant message.
    pub messages: Vec<Message>,

    /// Number of model calls made.
    pub steps: usize,
}

impl AgentResult {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the final assistant message.
    pub fn final_text(&self) -> Option<&str> {
        self.last_message().and_then(Message::content)
    }
}

/// A chat model plus the tools it may call.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: String,
    recursion_limit: usize,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
        recursion_limit: usize,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt: system_prompt.into(),
            recursion_limit,
        }
    }

    /// Runs the conversation until the model answers without calling a
    /// tool. Every model call counts against the recursion limit.
    ///
    /// Tool calls run one after another in the order the model listed them.
    /// A failing tool does not abort the run; its error is handed back to
    /// the model as the tool result.
    pub async fn invoke(
        &self,
        ctx: &ToolContext,
        input: Vec<Message>,
    ) -> Result<AgentResult, AgentError> {
        let mut messages = Vec::with_capacity(input.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(input);

        let definitions = self.tools.definitions();

        for step in 1..=self.recursion_limit {
            let turn = self.model.complete(&messages, &definitions).await?;

            if turn.tool_calls.is_empty() {
                tracing::debug!(step, "agent finished");
                messages.push(turn.into_message());
                return Ok(AgentResult {
                    messages,
                    steps: step,
                });
            }

            let calls = turn.tool_calls.clone();
            messages.push(turn.into_message());

            for call in calls {
                tracing::info!(step, tool = %call.name, "model requested tool");
                let output = match self.tools.execute(ctx, &call.name, call.arguments).await {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                        format!("Error: {}", e)
                    }
                };
                messages.push(Message::tool(call.id, output));
            }
        }

        tracing::error!(
            limit = self.recursion_limit,
            provider = self.model.provider_name(),
            model = self.model.model_name(),
            "recursion limit reached; the agent may be stuck in a loop"
        );
        Err(AgentError::RecursionLimit(self.recursion_limit))
    }
}
