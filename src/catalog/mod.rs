//! Product Catalog Module
//!
//! The catalog itself lives behind an external HTTP API. This module holds
//! the wire models and the client used by the add-to-cart handler and the
//! browse tool.

pub mod client;
pub mod models;

pub use client::{CatalogClient, CatalogError};
pub use models::{CatalogPage, CatalogQuery, Pagination, Product};
