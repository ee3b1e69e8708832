//! Chat endpoint response bodies and canned replies.

use serde::Serialize;

use crate::auth::{AuthorizationState, AuthorizationStatus};

pub const GREETING: &str = "Hello! I'm your shopping assistant. How can I help you today?";
pub const NO_MESSAGE: &str = "I didn't receive a message. Please try again.";
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that request.";
pub const RECURSION_REPLY: &str = "I apologize, but I encountered an issue processing your request. Please try rephrasing your question or ask for something more specific.";
pub const RECURSION_ERROR: &str = "Request too complex - please simplify";
pub const FALLBACK_REPLY: &str = "I'm your shopping assistant! I can help you with product recommendations and shopping. What would you like to do today?";

/// Body returned by `POST /api/chat`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_status: Option<AuthorizationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            authorization_status: None,
            authorization_message: None,
            error: None,
        }
    }

    /// Attaches the authorization outcome unless nothing was requested.
    pub fn with_authorization(mut self, state: AuthorizationState) -> Self {
        if state.status != AuthorizationStatus::Idle {
            self.authorization_status = Some(state.status);
            self.authorization_message = state.message;
        }
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
