//! HTTP API over the subscription service.

pub mod dto;
pub mod error;
pub mod routes;
pub mod timing;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
