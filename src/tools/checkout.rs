//! `checkout` tool: places an order for a single product with the shop API.
//!
//! Meant to be registered behind [`crate::auth::with_async_authorization`];
//! the access token it forwards comes from the approved backchannel request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

use super::{object_args, Tool, ToolContext, ToolError};
use crate::auth::AuthorizedTool;

pub const NAME: &str = "checkout";

const DESCRIPTION: &str = "Tool to checkout and complete grocery orders. Accepts the product, the quantity and an optional \
price limit. Calls the checkout API to process payment and finalize the order for delivery. \
The user is asked to approve the purchase on their device before the order is placed.";

/// Arguments of the checkout tool, also the body sent to the shop API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutArgs {
    pub product: String,
    pub qty: Number,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_limit: Option<Number>,
}

impl CheckoutArgs {
    pub fn parse(args: Value) -> Result<Self, ToolError> {
        serde_json::from_value(object_args(args)?)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))
    }

    pub fn binding_message(&self) -> String {
        format!("Do you want to buy {} {}", self.qty, self.product)
    }
}

pub struct CheckoutTool {
    http: reqwest::Client,
    shop_api_url: Option<String>,
}

impl CheckoutTool {
    /// With `shop_api_url` unset orders are acknowledged without a request.
    pub fn new(http: reqwest::Client, shop_api_url: Option<String>) -> Self {
        Self { http, shop_api_url }
    }
}

/// Logs at most the first 20 characters of a token.
pub(crate) fn token_prefix(token: &str) -> String {
    token.chars().take(20).collect()
}

#[async_trait]
impl Tool for CheckoutTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product": { "type": "string" },
                "qty": { "type": "number" },
                "priceLimit": { "type": "number" }
            },
            "required": ["product", "qty"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
        let args = CheckoutArgs::parse(args)?;
        tracing::info!(
            tool = NAME,
            product = %args.product,
            qty = %args.qty,
            price_limit = ?args.price_limit,
            "processing order"
        );

        let token = ctx.access_token();
        tracing::debug!(tool = NAME, token_available = token.is_some(), "checking credentials");
        if token.is_some() {
            ctx.authorization.approve_checkout();
        }

        let Some(url) = &self.shop_api_url else {
            return Ok(format!("Ordered {} {}", args.qty, args.product));
        };

        let mut request = self.http.post(url).json(&args);
        if let Some(token) = token {
            tracing::debug!(tool = NAME, token = %token_prefix(token), "using access token");
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::info!(tool = NAME, status = status.as_u16(), "shop API responded");

        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(tool = NAME, status = status.as_u16(), body = %text, "checkout failed");
            return Err(ToolError::ExecutionFailed(format!(
                "Checkout failed: {} - {}",
                status.as_u16(),
                text
            )));
        }

        if text.is_empty() {
            Ok(format!("Successfully ordered {} {}", args.qty, args.product))
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl AuthorizedTool for CheckoutTool {
    async fn binding_message(
        &self,
        _ctx: &ToolContext,
        args: &Value,
    ) -> Result<Option<String>, ToolError> {
        let args = CheckoutArgs::parse(args.clone())?;
        Ok(Some(args.binding_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arguments() {
        let args =
            CheckoutArgs::parse(json!({ "product": "apple", "qty": 2, "priceLimit": 10.5 }))
                .unwrap();
        assert_eq!(args.product, "apple");
        assert_eq!(args.qty.as_u64(), Some(2));
        assert_eq!(args.binding_message(), "Do you want to buy 2 apple");

        let body = serde_json::to_value(&args).unwrap();
        assert_eq!(body, json!({ "product": "apple", "qty": 2, "priceLimit": 10.5 }));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = CheckoutArgs::parse(json!({ "product": "apple" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn mock_order_with_credentials_marks_checkout_approved() {
        use crate::auth::{ciba::Credentials, AuthorizationStatus, AuthorizationTracker};
        use std::sync::Arc;

        let tool = CheckoutTool::new(reqwest::Client::new(), None);
        let tracker = Arc::new(AuthorizationTracker::new());
        let ctx = ToolContext::new("u1", tracker.clone());

        let out = tool
            .execute(&ctx, json!({ "product": "apple", "qty": 2 }))
            .await
            .unwrap();
        assert_eq!(out, "Ordered 2 apple");
        assert!(tracker.checkout_state().is_none());

        let granted = ctx.with_credentials(Credentials {
            access_token: "tok".into(),
            token_type: None,
            expires_in: None,
            scope: None,
        });
        tool.execute(&granted, json!({ "product": "apple", "qty": 2 }))
            .await
            .unwrap();
        assert_eq!(
            tracker.checkout_state().map(|s| s.status),
            Some(AuthorizationStatus::Approved)
        );
    }

    #[test]
    fn token_prefix_is_bounded() {
        assert_eq!(token_prefix("abc"), "abc");
        assert_eq!(token_prefix(&"x".repeat(50)).len(), 20);
    }
}
