//! `checkout_cart` tool: orders everything in the user's cart.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{checkout::token_prefix, failure, get_cart::fetch_cart, Tool, ToolContext, ToolError};
use crate::auth::AuthorizedTool;
use crate::cart::helpers::format_item_summary;

pub const NAME: &str = "checkout_cart";

const DESCRIPTION: &str = "Check out the user's entire shopping cart. Places one order with every item currently in the cart \
and empties the cart once the order is accepted. The user is asked to approve the purchase on their device first.";

pub struct CheckoutCartTool {
    http: reqwest::Client,
    base_url: String,
    shop_api_url: Option<String>,
}

impl CheckoutCartTool {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        shop_api_url: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            shop_api_url,
        }
    }

    async fn clear(&self, user_id: &str) {
        let result = self
            .http
            .post(format!("{}/api/clear-cart", self.base_url))
            .json(&json!({ "userId": user_id }))
            .send()
            .await
            .and_then(|r| r.error_for_status());
        if let Err(e) = result {
            tracing::error!(
                tool = NAME,
                error = %e,
                "order placed but the cart could not be cleared"
            );
        }
    }
}

#[async_trait]
impl Tool for CheckoutCartTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, ctx: &ToolContext, _args: Value) -> Result<String, ToolError> {
        let cart = match fetch_cart(&self.http, &self.base_url, &ctx.user_id).await {
            Ok(body) => body.cart,
            Err(msg) => return Ok(failure(msg)),
        };
        if cart.is_empty() {
            return Ok(failure("Cart is empty"));
        }
        let summary = format_item_summary(&cart.items);
        tracing::info!(tool = NAME, user_id = %ctx.user_id, items = %summary, "checking out cart");

        if ctx.access_token().is_some() {
            ctx.authorization.approve_checkout();
        }

        let order = match &self.shop_api_url {
            None => Value::Null,
            Some(url) => {
                let mut request = self.http.post(url).json(&json!({
                    "userId": ctx.user_id,
                    "items": cart.items,
                    "totalValue": cart.total_value,
                }));
                if let Some(token) = ctx.access_token() {
                    tracing::debug!(
                        tool = NAME,
                        token = %token_prefix(token),
                        "using access token"
                    );
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                if !status.is_success() {
                    return Err(ToolError::ExecutionFailed(format!(
                        "Checkout failed: {} - {}",
                        status.as_u16(),
                        text
                    )));
                }
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            }
        };

        self.clear(&ctx.user_id).await;

        Ok(json!({
            "success": true,
            "message": format!("Order placed: {}", summary),
            "order": order,
        })
        .to_string())
    }
}

#[async_trait]
impl AuthorizedTool for CheckoutCartTool {
    /// Empty carts need no approval; the tool reports them itself.
    async fn binding_message(
        &self,
        ctx: &ToolContext,
        _args: &Value,
    ) -> Result<Option<String>, ToolError> {
        let cart = fetch_cart(&self.http, &self.base_url, &ctx.user_id)
            .await
            .map_err(ToolError::ExecutionFailed)?;
        if cart.cart.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "Do you want to buy {}",
            format_item_summary(&cart.cart.items)
        )))
    }
}
