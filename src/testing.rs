//! Test utilities: stand-ins for the chat model and the external HTTP
//! services.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use crate::agent::{AgentError, AssistantTurn, ChatModel, Message};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// A chat model that replays pre-configured turns in order and records the
/// conversations it was shown. Running out of turns is a provider error.
#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    turns: Mutex<VecDeque<AssistantTurn>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedChatModel {
    pub fn new(turns: Vec<AssistantTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::default(),
        }
    }

    /// A model that answers every request with `text` once.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![AssistantTurn::text(text)])
    }

    /// Conversations received so far, one entry per model call.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[Value],
    ) -> Result<AssistantTurn, AgentError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(messages.to_vec());
        self.turns
            .lock()
            .expect("turns lock")
            .pop_front()
            .ok_or_else(|| AgentError::Provider("script exhausted".to_string()))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_turns_then_fails() {
        let model = ScriptedChatModel::replying("hello");
        let turn = model.complete(&[Message::user("hi")], &[]).await.unwrap();
        assert_eq!(turn.content.as_deref(), Some("hello"));

        assert!(model.complete(&[], &[]).await.is_err());
        assert_eq!(model.requests().len(), 2);
    }
}
