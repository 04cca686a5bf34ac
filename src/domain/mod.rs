//! # Domain Layer
//!
//! Subscription models, the cost filter value object and the error taxonomy.
//! This layer is independent of storage and transport.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
