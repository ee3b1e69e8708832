//! Shopping Agent
//!
//! A chat model that answers the user and calls the cart, catalog and
//! checkout tools on their behalf.

pub mod model;
pub mod openai;
pub mod prompt;
pub mod runner;

pub use model::{AgentError, AssistantTurn, ChatModel, Message, ToolCall};
pub use openai::OpenAiChatModel;
pub use runner::{Agent, AgentResult};

use crate::app_state::AppState;
use crate::auth::with_async_authorization;
use crate::tools::{
    AddToCartTool, BrowseCatalogTool, CheckoutCartTool, CheckoutTool, GetCartTool, ToolRegistry,
};

/// Tools for one user. The checkout tools are wrapped so they only run after
/// the user approved the purchase out of band.
pub fn build_tools(state: &AppState) -> ToolRegistry {
    let http = state.http.clone();
    let base_url = state.config.app_base_url.clone();
    let shop_api_url = state.config.shop_api_url.clone();

    ToolRegistry::new()
        .with(AddToCartTool::new(http.clone(), base_url.clone()))
        .with(BrowseCatalogTool::new(state.catalog.clone()))
        .with(GetCartTool::new(http.clone(), base_url.clone()))
        .with(with_async_authorization(
            CheckoutTool::new(http.clone(), shop_api_url.clone()),
            state.ciba.clone(),
        ))
        .with(with_async_authorization(
            CheckoutCartTool::new(http, base_url, shop_api_url),
            state.ciba.clone(),
        ))
}

/// Creates the agent for a chat request made by `user_id`.
pub fn create_agent(state: &AppState, user_id: &str) -> Agent {
    Agent::new(
        state.model.clone(),
        build_tools(state),
        prompt::system_prompt(user_id),
        state.config.recursion_limit,
    )
}
