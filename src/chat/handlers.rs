//! Chat route handlers
//!
//! `POST /api/chat` runs the shopping agent on the latest user message and
//! reports the outcome of any purchase authorization that happened on the
//! way.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::Instrument;
use uuid::Uuid;

use super::models::{
    ChatResponse, EMPTY_REPLY, FALLBACK_REPLY, GREETING, NO_MESSAGE, RECURSION_ERROR,
    RECURSION_REPLY,
};
use crate::{
    agent::{create_agent, AgentError, Message},
    app_state::SharedState,
    auth::AuthorizationTracker,
    tools::ToolContext,
};

/// Creates routes for the chat endpoint
pub fn routes() -> Router<SharedState> {
    Router::new().route("/api/chat", post(chat).get(status))
}

/// Endpoint: GET /api/chat
async fn status() -> Json<Value> {
    Json(json!({
        "status": "Agent Ready",
        "message": "Tool-calling agent active"
    }))
}

/// Endpoint: POST /api/chat
async fn chat(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) => {
            tracing::error!(error = %e.body_text(), "unreadable chat request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process request" })),
            )
                .into_response();
        }
    };

    let Some(last) = body
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.last())
    else {
        return Json(ChatResponse::message(GREETING)).into_response();
    };

    let Some(content) = last
        .get("content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
    else {
        return Json(ChatResponse::message(NO_MESSAGE)).into_response();
    };

    let user_id = headers
        .get(state.config.user_id_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4(), user_id = %user_id);
    let response = respond(&state, &user_id, content).instrument(span).await;

    Json(response).into_response()
}

/// Runs the agent for one user message and combines its answer with the
/// authorization outcome.
pub async fn respond(state: &SharedState, user_id: &str, content: &str) -> ChatResponse {
    tracing::info!(message = %content, "user message");

    // Authorization state never carries over from a previous request.
    let authorization = Arc::new(AuthorizationTracker::new());
    let ctx = ToolContext::new(user_id, authorization.clone());
    let agent = create_agent(state, user_id);

    match agent.invoke(&ctx, vec![Message::user(content)]).await {
        Ok(result) => {
            let reply = result
                .final_text()
                .filter(|text| !text.is_empty())
                .unwrap_or(EMPTY_REPLY);
            tracing::info!(steps = result.steps, reply = %reply, "agent replied");

            ChatResponse::message(reply).with_authorization(authorization.snapshot())
        }
        Err(AgentError::RecursionLimit(limit)) => {
            tracing::error!(limit, "agent hit the recursion limit");
            ChatResponse::message(RECURSION_REPLY).with_error(RECURSION_ERROR)
        }
        Err(e) => {
            tracing::error!(error = %e, "agent error");
            ChatResponse::message(FALLBACK_REPLY)
        }
    }
}
