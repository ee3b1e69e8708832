//! Shopping Assistant Library
//!
//! A chat backend where a tool-calling agent browses the product catalog,
//! manages the user's cart and places orders after the user approved them
//! out of band.

// Domain modules
pub mod agent;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod tools;

// Infrastructure
pub mod app_state;
pub mod config;
pub mod error;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;
