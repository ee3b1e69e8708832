//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain and the request/response bodies of the cart endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Most units of one product a single cart line may hold.
pub const MAX_ITEM_QUANTITY: u32 = 10_000;

/// Returns the default quantity (1) for cart requests
fn default_quantity() -> u32 {
    1
}

/// A line in a user's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product code from the catalog
    pub id: String,

    pub quantity: u32,

    /// Unit price at the time the item was first added
    pub price: f64,

    /// `price * quantity`
    pub total_price: f64,
}

impl CartItem {
    pub fn new(id: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            id: id.into(),
            quantity,
            price,
            total_price: price * f64::from(quantity),
        }
    }
}

/// A user's cart with derived totals
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,

    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Sum of item quantities
    #[serde(default)]
    pub total_items: u32,

    /// Sum of item total prices
    #[serde(default)]
    pub total_value: f64,
}

impl Cart {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Endpoint Bodies
// =============================================================================

/// Body of `POST /api/add-to-cart`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Quantity to add (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response of a successful `POST /api/add-to-cart`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub success: bool,
    pub message: String,
    pub cart_item: CartItem,
    pub cart: Cart,
}

/// Query of `GET /api/get-cart`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    pub user_id: Option<String>,
}

/// Response of `GET /api/get-cart`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCartResponse {
    pub success: bool,
    pub cart: Cart,
    pub message: String,
}

/// Body of `POST /api/clear-cart`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCartInput {
    pub user_id: Option<String>,
}

/// Response of `POST /api/clear-cart`
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCartResponse {
    pub success: bool,

    /// Whether a non-empty cart existed
    pub cleared: bool,
}
