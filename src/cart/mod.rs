//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (CartItem, Cart, endpoint bodies)
//! - Business logic helpers (merging, totals, formatting)
//! - The in-memory cart cache
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{Cart, CartItem};
pub use state::CartCache;
