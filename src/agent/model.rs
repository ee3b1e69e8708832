//! Conversation types and the chat-model abstraction the agent runs on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur during agent execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Recursion limit of {0} reached without a final answer")]
    RecursionLimit(usize),
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,

    /// Decoded arguments; left as a string when the model sent invalid JSON.
    pub arguments: Value,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Text content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Tool { content, .. } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Chat-completions wire format.
    pub fn to_openai(&self) -> Value {
        match self {
            Message::System { content } => json!({ "role": "system", "content": content }),
            Message::User { content } => json!({ "role": "user", "content": content }),
            Message::Tool {
                tool_call_id,
                content,
            } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut message = json!({ "role": "assistant", "content": content });
                if !tool_calls.is_empty() {
                    message["tool_calls"] = tool_calls
                        .iter()
                        .map(|call| {
                            let arguments = match &call.arguments {
                                Value::String(raw) => raw.clone(),
                                other => other.to_string(),
                            };
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": { "name": call.name, "arguments": arguments }
                            })
                        })
                        .collect::<Vec<_>>()
                        .into();
                }
                message
            }
        }
    }
}

/// What the model answered in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    pub fn into_message(self) -> Message {
        Message::Assistant {
            content: self.content,
            tool_calls: self.tool_calls,
        }
    }
}

/// Trait that chat-model providers implement.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Runs one completion over the conversation with the given function
    /// definitions available.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<AssistantTurn, AgentError>;

    /// Provider name for logging (e.g. "openai").
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_tool_calls_encode_arguments_as_strings() {
        let message = AssistantTurn::calls(vec![ToolCall {
            id: "call_1".into(),
            name: "add_to_cart".into(),
            arguments: json!({ "productCode": "apple" }),
        }])
        .into_message();

        let wire = message.to_openai();
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["content"], Value::Null);
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(
            wire["tool_calls"][0]["function"]["arguments"],
            r#"{"productCode":"apple"}"#
        );
    }

    #[test]
    fn plain_messages_encode_role_and_content() {
        assert_eq!(
            Message::user("hi").to_openai(),
            json!({ "role": "user", "content": "hi" })
        );
        assert_eq!(
            Message::tool("call_1", "ok").to_openai(),
            json!({ "role": "tool", "tool_call_id": "call_1", "content": "ok" })
        );
        let plain = AssistantTurn::text("hello").into_message().to_openai();
        assert!(plain.get("tool_calls").is_none());
    }

    #[test]
    fn agent_error_display() {
        assert!(AgentError::RecursionLimit(50).to_string().contains("50"));
        assert!(AgentError::Provider("boom".into()).to_string().contains("boom"));
    }
}
