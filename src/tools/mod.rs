//! Agent Tools
//!
//! Each tool packages one HTTP call behind a name, a description and a JSON
//! schema so the chat model can decide when to call it. Tools return plain
//! strings; most of them return a JSON document the model reads back.

pub mod add_to_cart;
pub mod browse_catalog;
pub mod checkout;
pub mod checkout_cart;
pub mod get_cart;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::{ciba::Credentials, state::AuthorizationTracker};

pub use add_to_cart::AddToCartTool;
pub use browse_catalog::BrowseCatalogTool;
pub use checkout::CheckoutTool;
pub use checkout_cart::CheckoutCartTool;
pub use get_cart::GetCartTool;

/// Error type for tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Per-call information a tool may need beyond its arguments.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Authenticated user the chat request runs for (may be empty).
    pub user_id: String,

    /// Authorization lifecycle of the current chat request.
    pub authorization: Arc<AuthorizationTracker>,

    /// Present once the user approved a backchannel authorization request.
    pub credentials: Option<Credentials>,
}

impl ToolContext {
    pub fn new(user_id: impl Into<String>, authorization: Arc<AuthorizationTracker>) -> Self {
        Self {
            user_id: user_id.into(),
            authorization,
            credentials: None,
        }
    }

    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..self.clone()
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.access_token.as_str())
    }
}

/// Trait for tools that the agent can use.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String, ToolError>;
}

/// Tools available to one agent, keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Tool definitions in the chat-completions function-calling format.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters(),
                    }
                })
            })
            .collect()
    }

    pub async fn execute(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: Value,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tracing::debug!(tool = name, "executing tool");
        tool.execute(ctx, args).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// Normalizes tool arguments into a JSON object.
///
/// Models sometimes pass the arguments as a JSON-encoded string; that string
/// is parsed. `null` becomes an empty object.
pub fn object_args(args: Value) -> Result<Value, ToolError> {
    match args {
        Value::Null => Ok(json!({})),
        Value::String(s) if s.trim().is_empty() => Ok(json!({})),
        Value::String(s) => serde_json::from_str::<Value>(&s)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| {
                ToolError::InvalidParameters(
                    "Invalid JSON input. Please provide a valid JSON string.".to_string(),
                )
            }),
        Value::Object(_) => Ok(args),
        other => Err(ToolError::InvalidParameters(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// The `{"success": false, "error": ...}` document tools hand back to the
/// model instead of failing.
pub fn failure(error: impl std::fmt::Display) -> String {
    json!({ "success": false, "error": error.to_string() }).to_string()
}
