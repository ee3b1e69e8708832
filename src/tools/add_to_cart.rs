//! `add_to_cart` tool: posts a product to the cart endpoint for the user.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{failure, object_args, Tool, ToolContext, ToolError};
use crate::cart::models::AddToCartInput;

pub const NAME: &str = "add_to_cart";

const DESCRIPTION: &str = "Add an item to the user's shopping cart. Use this tool when users ask to add products to their cart. \
Arguments: productCode (required): the product code/id (e.g. \"banana\", \"apple\", \"milk\"); \
quantity (optional): number of items to add (default: 1). \
Example: {\"productCode\": \"banana\", \"quantity\": 5} adds 5 bananas to the cart. \
This tool does not require step-up authorization, only basic login. \
Use this tool immediately when users express intent to add items to their cart.";

pub struct AddToCartTool {
    http: reqwest::Client,
    base_url: String,
}

impl AddToCartTool {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn add(&self, ctx: &ToolContext, input: &AddToCartInput) -> Result<Value, String> {
        let response = self
            .http
            .post(format!("{}/api/add-to-cart", self.base_url))
            .json(input)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let reason = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"))
                .to_string();
            return Err(format!("Failed to add item to cart: {}", reason));
        }

        tracing::info!(tool = NAME, user_id = %ctx.user_id, "item added successfully");

        Ok(json!({
            "success": true,
            "message": body["message"],
            "cartItem": body["cartItem"],
            "totalItems": body["cart"]["totalItems"],
        }))
    }
}

/// Reads the model's arguments into a cart request. `id` is accepted as an
/// alias for `productCode`; a missing or zero quantity means one.
fn parse_input(args: &Value, user_id: &str) -> Result<AddToCartInput, String> {
    let text = |key: &str| {
        args.get(key)
            .and_then(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
    };

    let product_code = text("productCode").or_else(|| text("id"));
    let product_name = text("productName");
    if product_code.is_none() && product_name.is_none() {
        return Err("Either productCode or productName is required".to_string());
    }

    let quantity = args
        .get("quantity")
        .and_then(Value::as_u64)
        .filter(|q| *q > 0)
        .map(|q| u32::try_from(q).unwrap_or(u32::MAX))
        .unwrap_or(1);

    Ok(AddToCartInput {
        product_code,
        product_name,
        quantity,
        user_id: Some(user_id.to_string()),
    })
}

#[async_trait]
impl Tool for AddToCartTool {
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
                "productCode": {
                    "type": "string",
                    "description": "Product code/id from the catalog"
                },
                "quantity": { "type": "integer", "minimum": 1, "default": 1 }
            },
            "required": ["productCode"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
        tracing::debug!(tool = NAME, user_id = %ctx.user_id, %args, "called");

        let args = match object_args(args) {
            Ok(args) => args,
            Err(ToolError::InvalidParameters(msg)) => return Ok(failure(msg)),
            Err(e) => return Err(e),
        };

        let input = match parse_input(&args, &ctx.user_id) {
            Ok(input) => input,
            Err(msg) => return Ok(failure(msg)),
        };

        match self.add(ctx, &input).await {
            Ok(result) => Ok(result.to_string()),
            Err(msg) => {
                tracing::error!(tool = NAME, error = %msg, "error adding item to cart");
                Ok(failure(msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_an_alias_for_product_code() {
        let input = parse_input(&json!({ "id": "banana", "quantity": 5 }), "u1").unwrap();
        assert_eq!(input.product_code.as_deref(), Some("banana"));
        assert_eq!(input.quantity, 5);
        assert_eq!(input.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn product_code_wins_over_id() {
        let input = parse_input(&json!({ "id": "x", "productCode": "apple" }), "u1").unwrap();
        assert_eq!(input.product_code.as_deref(), Some("apple"));
    }

    #[test]
    fn quantity_defaults_to_one() {
        let input = parse_input(&json!({ "productCode": "apple" }), "u1").unwrap();
        assert_eq!(input.quantity, 1);

        let input = parse_input(&json!({ "productCode": "apple", "quantity": 0 }), "u1").unwrap();
        assert_eq!(input.quantity, 1);
    }

    #[test]
    fn missing_product_is_rejected() {
        let err = parse_input(&json!({ "quantity": 2 }), "u1").unwrap_err();
        assert_eq!(err, "Either productCode or productName is required");

        assert!(parse_input(&json!({ "productName": "Jeans" }), "u1").is_ok());
    }
}
