//! OpenAI adapter implementing [`ChatModel`] over the Chat Completions API
//! with function calling.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::model::{AgentError, AssistantTurn, ChatModel, Message, ToolCall};
use crate::config::ModelConfig;

const MAX_TOKENS: u32 = 1024;

/// Calls `<base_url>/v1/chat/completions`.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(client: reqwest::Client, config: &ModelConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }

    /// Build the JSON request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[Message], tools: &[Value]) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": messages.iter().map(Message::to_openai).collect::<Vec<_>>(),
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
            body["tool_choice"] = json!("auto");
        }
        body
    }

    /// Parse a Chat Completions response into an assistant turn.
    pub fn parse_response(response_body: &Value) -> Result<AssistantTurn, AgentError> {
        let message = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| {
                AgentError::InvalidResponse("missing choices[0].message in response".to_string())
            })?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let tool_calls = message
            .get("tool_calls")
            .and_then(|t| t.as_array())
            .map(|calls| calls.iter().map(parse_tool_call).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();

        Ok(AssistantTurn {
            content,
            tool_calls,
        })
    }
}

fn parse_tool_call(tool_call: &Value) -> Result<ToolCall, AgentError> {
    let id = tool_call
        .get("id")
        .and_then(|i| i.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("tool_call missing id".to_string()))?;

    let function = tool_call
        .get("function")
        .ok_or_else(|| AgentError::InvalidResponse("tool_call missing function".to_string()))?;

    let name = function
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("function missing name".to_string()))?;

    let raw = function
        .get("arguments")
        .and_then(|a| a.as_str())
        .unwrap_or("{}");
    let arguments =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    })
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<AssistantTurn, AgentError> {
        let body = self.build_request_body(messages, tools);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "API returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_stub;
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn model(base_url: &str) -> OpenAiChatModel {
        OpenAiChatModel::new(
            reqwest::Client::new(),
            &ModelConfig {
                api_key: "sk-test".into(),
                base_url: base_url.into(),
                model: "gpt-test".into(),
            },
        )
    }

    #[test]
    fn request_body_includes_tools_only_when_present() {
        let m = model("http://unused");
        let body = m.build_request_body(&[Message::user("hi")], &[]);
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert!(body.get("tools").is_none());

        let body = m.build_request_body(&[Message::user("hi")], &[json!({ "type": "function" })]);
        assert_eq!(body["tools"].as_array().unwrap().len(), 1);
        assert_eq!(body["tool_choice"], "auto");
    }

    #[test]
    fn parses_text_response() {
        let turn = OpenAiChatModel::parse_response(&json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Hello!" },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        assert_eq!(turn, AssistantTurn::text("Hello!"));
    }

    #[test]
    fn parses_tool_calls() {
        let turn = OpenAiChatModel::parse_response(&json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "browse_catalog",
                                "arguments": "{\"search\":\"apple\"}"
                            }
                        },
                        {
                            "id": "call_2",
                            "type": "function",
                            "function": { "name": "get_cart", "arguments": "not json" }
                        }
                    ]
                }
            }]
        }))
        .unwrap();

        assert!(turn.content.is_none());
        assert_eq!(turn.tool_calls.len(), 2);
        assert_eq!(turn.tool_calls[0].arguments, json!({ "search": "apple" }));
        assert_eq!(turn.tool_calls[1].arguments, json!("not json"));
    }

    #[test]
    fn rejects_malformed_response() {
        let err = OpenAiChatModel::parse_response(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn maps_http_statuses() {
        let router = Router::new()
            .route(
                "/limited/v1/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/broken/v1/chat/completions",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/ok/v1/chat/completions",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["model"], "gpt-test");
                    Json(json!({ "choices": [{ "message": { "content": "hi there" } }] }))
                }),
            );
        let base = spawn_stub(router).await;

        let err = model(&format!("{}/limited", base))
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::RateLimited));

        let err = model(&format!("{}/broken", base))
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));

        let turn = model(&format!("{}/ok", base))
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap();
        assert_eq!(turn.content.as_deref(), Some("hi there"));
    }
}
