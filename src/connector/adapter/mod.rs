mod cost_query;
mod duckdb_subscription_repository;
mod in_memory_subscription_repository;

pub use cost_query::*;
pub use duckdb_subscription_repository::*;
pub use in_memory_subscription_repository::*;
