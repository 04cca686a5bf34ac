//! # Connector Layer
//!
//! External integrations implementing and driving the application ports:
//! - Storage (DuckDB for durable subscriptions, in-memory for tests)
//! - CLI router and controllers
//! - HTTP API (axum)

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
