//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart operations and formatting.

use super::models::{Cart, CartItem, MAX_ITEM_QUANTITY};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    #[error("Quantity for {id} cannot exceed {limit}")]
    QuantityLimit { id: String, limit: u32 },
}

/// Merges `incoming` into `items`, aggregating quantities for an existing
/// entry with the same id and appending brand new ones.
///
/// The stored unit price is kept; the line total is recomputed from it.
/// A line may never hold more than [`MAX_ITEM_QUANTITY`] units; on overflow
/// `items` is left untouched.
pub fn merge_item(items: &mut Vec<CartItem>, incoming: CartItem) -> Result<(), CartError> {
    let limit = || CartError::QuantityLimit {
        id: incoming.id.clone(),
        limit: MAX_ITEM_QUANTITY,
    };

    match items.iter_mut().find(|i| i.id == incoming.id) {
        Some(existing) => {
            let quantity = existing
                .quantity
                .checked_add(incoming.quantity)
                .filter(|q| *q <= MAX_ITEM_QUANTITY)
                .ok_or_else(limit)?;
            existing.quantity = quantity;
            existing.total_price = existing.price * f64::from(quantity);
        }
        None if incoming.quantity > MAX_ITEM_QUANTITY => return Err(limit()),
        None => items.push(incoming),
    }
    Ok(())
}

/// Recomputes the derived totals of a cart.
pub fn recompute_totals(cart: &mut Cart) {
    cart.total_items = cart
        .items
        .iter()
        .fold(0u32, |total, i| total.saturating_add(i.quantity));
    cart.total_value = cart.items.iter().map(|i| i.total_price).sum();
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x TS001, 1x JN002"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.id))
        .collect::<Vec<_>>()
        .join(", ")
}
