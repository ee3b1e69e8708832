//! Chat Module
//!
//! The conversational entry point: request parsing, the per-request
//! authorization reset, agent invocation and the combined response.

pub mod handlers;
pub mod models;

pub use handlers::routes;
pub use models::ChatResponse;
