//! Shopping Cart State Management
//!
//! Carts live in process memory, keyed by user id.

use super::{
    helpers::{merge_item, recompute_totals, CartError},
    models::{Cart, CartItem},
};
use dashmap::DashMap;

/// In-memory cart storage shared by all requests.
#[derive(Debug, Default)]
pub struct CartCache {
    /// DashMap allows concurrent access without external Mutexes.
    carts: DashMap<String, Cart>,
}

impl CartCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` to the user's cart, creating the cart when needed, and
    /// returns a snapshot of the updated cart. The cart is unchanged when the
    /// line would exceed the quantity limit.
    pub fn add_item(&self, user_id: &str, item: CartItem) -> Result<Cart, CartError> {
        let mut cart = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(|| Cart::empty(user_id));

        merge_item(&mut cart.items, item)?;
        recompute_totals(&mut cart);

        Ok(cart.value().clone())
    }

    /// Returns the user's cart, or an empty one.
    pub fn get(&self, user_id: &str) -> Cart {
        self.carts
            .get(user_id)
            .map(|cart| cart.value().clone())
            .unwrap_or_else(|| Cart::empty(user_id))
    }

    /// Removes the user's cart and returns it.
    pub fn clear(&self, user_id: &str) -> Option<Cart> {
        self.carts.remove(user_id).map(|(_, cart)| cart)
    }
}
