//! `get_cart` tool: reads the user's cart through the cart endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{failure, Tool, ToolContext, ToolError};
use crate::cart::models::GetCartResponse;

pub const NAME: &str = "get_cart";

pub struct GetCartTool {
    http: reqwest::Client,
    base_url: String,
}

impl GetCartTool {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, user_id: &str) -> Result<GetCartResponse, String> {
        fetch_cart(&self.http, &self.base_url, user_id).await
    }
}

/// `GET <base>/api/get-cart?userId=` shared with the cart checkout tool.
pub(crate) async fn fetch_cart(
    http: &reqwest::Client,
    base_url: &str,
    user_id: &str,
) -> Result<GetCartResponse, String> {
    let response = http
        .get(format!("{}/api/get-cart", base_url))
        .query(&[("userId", user_id)])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("HTTP error! status: {}", response.status().as_u16()));
    }

    let body: GetCartResponse = response.json().await.map_err(|e| e.to_string())?;
    if !body.success {
        return Err("Failed to get cart".to_string());
    }
    Ok(body)
}

#[async_trait]
impl Tool for GetCartTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Get the current cart contents for the authenticated user"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, ctx: &ToolContext, _args: Value) -> Result<String, ToolError> {
        tracing::debug!(tool = NAME, user_id = %ctx.user_id, "called");

        match self.fetch(&ctx.user_id).await {
            Ok(body) => {
                let message = if body.message.is_empty() {
                    "Cart retrieved successfully".to_string()
                } else {
                    body.message
                };
                Ok(json!({ "success": true, "cart": body.cart, "message": message }).to_string())
            }
            Err(msg) => {
                tracing::error!(tool = NAME, error = %msg, "error getting cart");
                Ok(failure(msg))
            }
        }
    }
}

