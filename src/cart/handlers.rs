//! REST API handlers for shopping cart operations
//!
//! These are the endpoints the agent's cart tools call: adding a catalog
//! product to a user's cart, reading the cart back, and clearing it after
//! an order went through.

use super::models::{
    AddToCartInput, AddToCartResponse, CartItem, CartQuery, ClearCartInput, ClearCartResponse,
    GetCartResponse, MAX_ITEM_QUANTITY,
};
use crate::{app_state::SharedState, error::AppError};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/add-to-cart", post(add_to_cart).get(health))
        .route("/api/get-cart", get(get_cart))
        .route("/api/clear-cart", post(clear_cart))
}

/// Endpoint: GET /api/add-to-cart
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Add to cart API is running"
    }))
}

/// Endpoint: POST /api/add-to-cart
/// Resolves the product in the catalog and adds it to the user's cart.
async fn add_to_cart(
    State(state): State<SharedState>,
    body: Result<Json<AddToCartInput>, JsonRejection>,
) -> Result<Json<AddToCartResponse>, AppError> {
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let user_id = require_user_id(input.user_id)?;

    let product_code = input.product_code.filter(|c| !c.is_empty());
    let product_name = input.product_name.filter(|n| !n.is_empty());
    if product_code.is_none() && product_name.is_none() {
        return Err(AppError::BadRequest(
            "Either productCode or productName is required".to_string(),
        ));
    }

    if input.quantity > MAX_ITEM_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity cannot exceed {}",
            MAX_ITEM_QUANTITY
        )));
    }

    // Lookup is by exact code only; a bare name never resolves.
    let product = match product_code {
        Some(code) => state.catalog.find_product(&code).await,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound("Product not found in catalog".to_string()))?;

    let cart_item = CartItem::new(product.id, input.quantity, product.price);
    let cart = state
        .carts
        .add_item(&user_id, cart_item.clone())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(
        user_id = %user_id,
        item = %cart_item.id,
        quantity = cart_item.quantity,
        total_items = cart.total_items,
        "item added to cart"
    );

    Ok(Json(AddToCartResponse {
        success: true,
        message: format!("Added {} x {} to cart", cart_item.quantity, cart_item.id),
        cart_item,
        cart,
    }))
}

/// Endpoint: GET /api/get-cart?userId=
async fn get_cart(
    State(state): State<SharedState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<GetCartResponse>, AppError> {
    let user_id = require_user_id(query.user_id)?;

    Ok(Json(GetCartResponse {
        success: true,
        cart: state.carts.get(&user_id),
        message: "Cart retrieved successfully".to_string(),
    }))
}

/// Endpoint: POST /api/clear-cart
async fn clear_cart(
    State(state): State<SharedState>,
    body: Result<Json<ClearCartInput>, JsonRejection>,
) -> Result<Json<ClearCartResponse>, AppError> {
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let user_id = require_user_id(input.user_id)?;

    let cleared = state
        .carts
        .clear(&user_id)
        .map(|cart| !cart.is_empty())
        .unwrap_or(false);

    tracing::info!(user_id = %user_id, cleared, "cart cleared");

    Ok(Json(ClearCartResponse {
        success: true,
        cleared,
    }))
}

fn require_user_id(user_id: Option<String>) -> Result<String, AppError> {
    user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))
}
